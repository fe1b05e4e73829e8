//! Patient endpoints. All routes are owner-scoped to the authenticated doctor.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::api::endpoints::auth::MessageResponse;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::models::{NewPatient, Patient, PatientUpdate};
use crate::patients;

/// `GET /api/patients`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(patients::list_patients(ctx.core.db(), doctor.id())?))
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Json(input): Json<NewPatient>,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(patients::create_patient(ctx.core.db(), doctor.id(), input)?))
}

/// `PUT /api/patients/:id`: partial merge of the supplied fields.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<String>,
    Json(update): Json<PatientUpdate>,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(patients::update_patient(
        ctx.core.db(),
        doctor.id(),
        &id,
        update,
    )?))
}

/// `DELETE /api/patients/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    patients::delete_patient(ctx.core.db(), doctor.id(), &id)?;
    Ok(Json(MessageResponse {
        message: "Patient deleted successfully",
    }))
}
