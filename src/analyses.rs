//! Analysis registry: list and detail views over stored analyses.

use crate::db::{self, Database, DatabaseError};
use crate::models::{AnalysisDetail, AnalysisListItem, PatientSnapshot};

/// Upper bound on analyses returned by one list call.
pub const ANALYSIS_LIST_LIMIT: usize = 1000;

/// Shown in list views when the referenced patient no longer exists.
pub const UNKNOWN_PATIENT_NAME: &str = "Unknown";

/// The caller's analyses without image data, each with its patient's current name.
pub fn list_analyses(db: &Database, doctor_id: &str) -> Result<Vec<AnalysisListItem>, DatabaseError> {
    db.with_conn(|conn| {
        let summaries = db::list_analysis_summaries(conn, doctor_id, ANALYSIS_LIST_LIMIT)?;

        let mut items = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let patient_name = db::get_owned_patient(conn, &summary.patient_id, doctor_id)?
                .map(|p| p.name)
                .unwrap_or_else(|| UNKNOWN_PATIENT_NAME.to_string());

            items.push(AnalysisListItem {
                id: summary.id,
                patient_id: summary.patient_id,
                patient_name,
                prediction: summary.prediction,
                confidence: summary.confidence,
                report: summary.report,
                created_at: summary.created_at,
            });
        }
        Ok(items)
    })
}

/// Full analysis with image payload and a snapshot of the patient, if it still exists.
pub fn analysis_detail(
    db: &Database,
    doctor_id: &str,
    analysis_id: &str,
) -> Result<AnalysisDetail, DatabaseError> {
    db.with_conn(|conn| {
        let analysis = db::get_owned_analysis(conn, analysis_id, doctor_id)?
            .ok_or_else(|| DatabaseError::not_found("Analysis", analysis_id))?;

        let patient = db::get_owned_patient(conn, &analysis.patient_id, doctor_id)?
            .as_ref()
            .map(PatientSnapshot::from);

        Ok(AnalysisDetail {
            id: analysis.id,
            patient,
            prediction: analysis.prediction,
            confidence: analysis.confidence,
            all_predictions: analysis.all_predictions,
            report: analysis.report,
            image_data: analysis.image_data,
            created_at: analysis.created_at,
        })
    })
}
