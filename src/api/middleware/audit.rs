//! Audit logging middleware.
//!
//! Wraps the whole `/api` tree, outside the auth gate, so rejected
//! requests are logged too. The doctor id is read from the response
//! extensions, where the auth middleware leaves it once a token resolves.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::DoctorContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;
    let doctor_id = response.extensions().get::<DoctorContext>().map(|d| d.id());

    tracing::info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        doctor_id = doctor_id.unwrap_or("-"),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "API request"
    );

    response
}
