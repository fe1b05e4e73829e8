//! Authentication endpoints.
//!
//! `POST /api/auth/session`: Unprotected: exchange a provider session id
//! `GET /api/auth/me`: Protected: current doctor profile
//! `POST /api/auth/logout`: Unprotected: end the presented session, if any

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::auth::{self, SessionGrant};
use crate::models::UserProfile;

#[derive(Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `POST /api/auth/session`: trade the provider's `session_id` for a local
/// session token and the doctor's profile.
pub async fn create_session(
    State(ctx): State<ApiContext>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionGrant>, ApiError> {
    let grant =
        auth::exchange_session(ctx.core.db(), ctx.core.identity(), &request.session_id).await?;
    Ok(Json(grant))
}

/// `GET /api/auth/me`
pub async fn me(Extension(doctor): Extension<DoctorContext>) -> Json<UserProfile> {
    Json(UserProfile::from(&doctor.user))
}

/// `POST /api/auth/logout`: always succeeds from the client's point of view.
pub async fn logout(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    auth::revoke_session(ctx.core.db(), auth::bearer_token(&headers))?;
    Ok(Json(MessageResponse {
        message: "Logged out successfully",
    }))
}
