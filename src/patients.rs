//! Patient registry: owner-scoped CRUD over patient records.
//!
//! Every operation takes the authenticated doctor's id. A patient owned by
//! another doctor is indistinguishable from one that does not exist.

use crate::db::{self, Database, DatabaseError};
use crate::models::{NewPatient, Patient, PatientUpdate};

/// Upper bound on patients returned by one list call.
pub const PATIENT_LIST_LIMIT: usize = 1000;

pub fn list_patients(db: &Database, doctor_id: &str) -> Result<Vec<Patient>, DatabaseError> {
    db.with_conn(|conn| db::list_patients(conn, doctor_id, PATIENT_LIST_LIMIT))
}

/// Create a patient owned by `doctor_id`.
pub fn create_patient(
    db: &Database,
    doctor_id: &str,
    input: NewPatient,
) -> Result<Patient, DatabaseError> {
    let patient = Patient::create(doctor_id, input);
    db.with_conn(|conn| db::insert_patient(conn, &patient))?;
    tracing::info!(doctor_id, patient_id = %patient.id, "Patient created");
    Ok(patient)
}

/// Merge `update` into an owned patient and return the stored result.
///
/// An update with no fields set returns the patient unchanged.
pub fn update_patient(
    db: &Database,
    doctor_id: &str,
    patient_id: &str,
    update: PatientUpdate,
) -> Result<Patient, DatabaseError> {
    db.with_conn(|conn| {
        let mut patient = db::get_owned_patient(conn, patient_id, doctor_id)?
            .ok_or_else(|| DatabaseError::not_found("Patient", patient_id))?;

        if update.is_empty() {
            return Ok(patient);
        }

        update.apply_to(&mut patient);
        if db::update_patient(conn, &patient)? == 0 {
            return Err(DatabaseError::not_found("Patient", patient_id));
        }
        Ok(patient)
    })
}

/// Delete an owned patient. Its analyses are kept.
pub fn delete_patient(db: &Database, doctor_id: &str, patient_id: &str) -> Result<(), DatabaseError> {
    let deleted = db.with_conn(|conn| db::delete_owned_patient(conn, patient_id, doctor_id))?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("Patient", patient_id));
    }
    tracing::info!(doctor_id, patient_id, "Patient deleted");
    Ok(())
}
