//! Analysis orchestrator: one upload in, one persisted `Analysis` out.
//!
//! Either a complete analysis is stored and returned, or nothing is. The
//! only failure that does not abort is the classification call, which
//! degrades to fallback predictions.

use tracing::info;

use super::classifier::{classify_with_fallback, primary_prediction, ImageClassifier};
use super::preprocess::prepare_image;
use super::prompt::{build_report_prompt, REPORT_SYSTEM_PROMPT};
use super::report::ReportGenerator;
use super::PipelineError;
use crate::db::{self, Database};
use crate::models::Analysis;

/// Result of a pipeline run, with the classification branch that fed it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub analysis: Analysis,
    pub used_fallback: bool,
}

/// Borrowed view of the collaborators a single analysis needs.
pub struct AnalysisPipeline<'a> {
    db: &'a Database,
    classifier: &'a dyn ImageClassifier,
    reporter: &'a dyn ReportGenerator,
}

impl<'a> AnalysisPipeline<'a> {
    pub fn new(
        db: &'a Database,
        classifier: &'a dyn ImageClassifier,
        reporter: &'a dyn ReportGenerator,
    ) -> Self {
        Self {
            db,
            classifier,
            reporter,
        }
    }

    /// Analyze `upload` for `patient_id` on behalf of `doctor_id`.
    pub async fn run(
        &self,
        doctor_id: &str,
        patient_id: &str,
        upload: &[u8],
    ) -> Result<PipelineOutput, PipelineError> {
        // 1. Ownership check
        let patient = self
            .db
            .with_conn(|conn| db::get_owned_patient(conn, patient_id, doctor_id))?
            .ok_or(PipelineError::PatientNotFound)?;

        // 2-4. Decode, normalize, encode
        let image = prepare_image(upload)?;

        // 5. Classify (never fails)
        let outcome = classify_with_fallback(self.classifier, &image.jpeg).await;
        let used_fallback = outcome.is_fallback();
        let predictions = outcome.into_predictions();
        let primary = primary_prediction(&predictions);

        // 6. Narrative report
        let prompt = build_report_prompt(&patient, &primary, &predictions);
        let report = self.reporter.generate(REPORT_SYSTEM_PROMPT, &prompt).await?;

        // 7. Persist
        let analysis = Analysis::new(
            doctor_id,
            patient_id,
            image.base64,
            &primary,
            predictions,
            report,
        );
        self.db
            .with_conn(|conn| db::insert_analysis(conn, &analysis))?;

        info!(
            doctor_id,
            patient_id,
            analysis_id = %analysis.id,
            prediction = %analysis.prediction,
            confidence = analysis.confidence,
            used_fallback,
            "Analysis stored"
        );

        Ok(PipelineOutput {
            analysis,
            used_fallback,
        })
    }
}
