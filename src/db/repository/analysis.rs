use rusqlite::{params, Connection};

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::{Analysis, Prediction};

/// Analysis columns minus the image payload, used by list views.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummaryRow {
    pub id: String,
    pub patient_id: String,
    pub prediction: String,
    pub confidence: f64,
    pub report: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub fn insert_analysis(conn: &Connection, analysis: &Analysis) -> Result<(), DatabaseError> {
    let predictions_json = serde_json::to_string(&analysis.all_predictions)?;
    conn.execute(
        "INSERT INTO analyses (id, doctor_id, patient_id, image_data, prediction, confidence,
         all_predictions, report, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            analysis.id,
            analysis.doctor_id,
            analysis.patient_id,
            analysis.image_data,
            analysis.prediction,
            analysis.confidence,
            predictions_json,
            analysis.report,
            format_timestamp(&analysis.created_at),
        ],
    )?;
    Ok(())
}

/// Analyses owned by `doctor_id` without image data, in insertion order.
pub fn list_analysis_summaries(
    conn: &Connection,
    doctor_id: &str,
    limit: usize,
) -> Result<Vec<AnalysisSummaryRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, prediction, confidence, report, created_at
         FROM analyses WHERE doctor_id = ?1 ORDER BY rowid LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![doctor_id, limit as i64], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut summaries = Vec::new();
    for row in rows {
        let (id, patient_id, prediction, confidence, report, created_at) = row?;
        summaries.push(AnalysisSummaryRow {
            id,
            patient_id,
            prediction,
            confidence,
            report,
            created_at: parse_timestamp("analyses.created_at", &created_at)?,
        });
    }
    Ok(summaries)
}

/// Fetch a full analysis only if it belongs to `doctor_id`.
pub fn get_owned_analysis(
    conn: &Connection,
    id: &str,
    doctor_id: &str,
) -> Result<Option<Analysis>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, doctor_id, patient_id, image_data, prediction, confidence,
         all_predictions, report, created_at
         FROM analyses WHERE id = ?1 AND doctor_id = ?2",
        params![id, doctor_id],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        },
    );

    let (id, doctor_id, patient_id, image_data, prediction, confidence, predictions, report, created_at) =
        match result {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

    let all_predictions: Vec<Prediction> = serde_json::from_str(&predictions)?;

    Ok(Some(Analysis {
        id,
        doctor_id,
        patient_id,
        image_data,
        prediction,
        confidence,
        all_predictions,
        report,
        created_at: parse_timestamp("analyses.created_at", &created_at)?,
    }))
}
