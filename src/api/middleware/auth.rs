//! Bearer token authentication middleware.
//!
//! Extracts the session token from `Authorization`, resolves it through the
//! session gate and injects `DoctorContext` into request extensions for
//! downstream handlers. The same context is attached to the response so
//! the outer audit layer can attribute the request.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::auth::{authenticate, bearer_token};

/// Require a live session.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
/// On success: injects `DoctorContext` into the request and the response,
/// and adds a `Cache-Control` header.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let user = authenticate(ctx.core.db(), bearer_token(req.headers()))?
        .ok_or(ApiError::Unauthorized)?;

    let doctor = DoctorContext { user };
    req.extensions_mut().insert(doctor.clone());

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-store"));
    response.extensions_mut().insert(doctor);

    Ok(response)
}
