//! Analysis history endpoints.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::analyses;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::models::{AnalysisDetail, AnalysisListItem};

/// `GET /api/analyses`: without image payloads.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<Vec<AnalysisListItem>>, ApiError> {
    Ok(Json(analyses::list_analyses(ctx.core.db(), doctor.id())?))
}

/// `GET /api/analyses/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisDetail>, ApiError> {
    Ok(Json(analyses::analysis_detail(ctx.core.db(), doctor.id(), &id)?))
}
