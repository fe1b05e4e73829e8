use rusqlite::{params, Connection, Row};

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::Patient;

const PATIENT_COLUMNS: &str =
    "id, doctor_id, name, age, gender, medical_history, created_at";

// Internal row type for Patient mapping
struct PatientRow {
    id: String,
    doctor_id: String,
    name: String,
    age: i64,
    gender: String,
    medical_history: Option<String>,
    created_at: String,
}

fn read_patient_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        name: row.get(2)?,
        age: row.get(3)?,
        gender: row.get(4)?,
        medical_history: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        created_at: parse_timestamp("patients.created_at", &row.created_at)?,
        id: row.id,
        doctor_id: row.doctor_id,
        name: row.name,
        age: row.age,
        gender: row.gender,
        medical_history: row.medical_history,
    })
}

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, doctor_id, name, age, gender, medical_history, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            patient.id,
            patient.doctor_id,
            patient.name,
            patient.age,
            patient.gender,
            patient.medical_history,
            format_timestamp(&patient.created_at),
        ],
    )?;
    Ok(())
}

/// Patients owned by `doctor_id`, in insertion order, at most `limit` rows.
pub fn list_patients(
    conn: &Connection,
    doctor_id: &str,
    limit: usize,
) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE doctor_id = ?1 ORDER BY rowid LIMIT ?2"
    ))?;

    let rows = stmt.query_map(params![doctor_id, limit as i64], read_patient_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

/// Fetch a patient only if it belongs to `doctor_id`.
pub fn get_owned_patient(
    conn: &Connection,
    id: &str,
    doctor_id: &str,
) -> Result<Option<Patient>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1 AND doctor_id = ?2"),
        params![id, doctor_id],
        read_patient_row,
    );

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Overwrite the mutable fields of an owned patient. Returns rows affected.
pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE patients SET name = ?1, age = ?2, gender = ?3, medical_history = ?4
         WHERE id = ?5 AND doctor_id = ?6",
        params![
            patient.name,
            patient.age,
            patient.gender,
            patient.medical_history,
            patient.id,
            patient.doctor_id,
        ],
    )?;
    Ok(updated)
}

/// Delete an owned patient. Analyses referencing it are left in place.
pub fn delete_owned_patient(
    conn: &Connection,
    id: &str,
    doctor_id: &str,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM patients WHERE id = ?1 AND doctor_id = ?2",
        params![id, doctor_id],
    )?;
    Ok(deleted)
}
