//! X-ray upload endpoint.
//!
//! `POST /api/analyze`: multipart form with a `file` part (the image) and a
//! `patient_id` text part. Runs the full analysis pipeline and returns the
//! stored result.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::models::Prediction;
use crate::pipeline::{upload_too_large_message, AnalysisPipeline, MAX_UPLOAD_BYTES};

/// Request body cap for `/analyze`: the image limit plus multipart framing.
pub const ANALYZE_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub id: String,
    pub prediction: String,
    pub confidence: f64,
    pub all_predictions: Vec<Prediction>,
    pub report: String,
    pub image_data: String,
}

struct AnalyzeForm {
    file: Vec<u8>,
    patient_id: String,
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::Validation(upload_too_large_message())
    } else {
        ApiError::Validation(e.body_text())
    }
}

/// Buffer the file part, stopping as soon as it passes the upload cap.
async fn read_file(mut field: Field<'_>) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::Validation(upload_too_large_message()));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, ApiError> {
    let mut file = None;
    let mut patient_id = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                file = Some(read_file(field).await?);
            }
            Some("patient_id") => {
                patient_id = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok(AnalyzeForm {
        file: file.ok_or_else(|| ApiError::Validation("Missing form field: file".into()))?,
        patient_id: patient_id
            .ok_or_else(|| ApiError::Validation("Missing form field: patient_id".into()))?,
    })
}

/// `POST /api/analyze`
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let form = read_form(multipart).await?;

    let pipeline = AnalysisPipeline::new(ctx.core.db(), ctx.core.classifier(), ctx.core.reporter());
    let output = pipeline
        .run(doctor.id(), &form.patient_id, &form.file)
        .await
        .map_err(|e| {
            tracing::error!(
                doctor_id = doctor.id(),
                patient_id = %form.patient_id,
                error = %e,
                "Analysis failed"
            );
            ApiError::from(e)
        })?;

    let analysis = output.analysis;
    Ok(Json(AnalyzeResponse {
        id: analysis.id,
        prediction: analysis.prediction,
        confidence: analysis.confidence,
        all_predictions: analysis.all_predictions,
        report: analysis.report,
        image_data: analysis.image_data,
    }))
}
