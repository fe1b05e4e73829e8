//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack on protected routes (outermost → innermost):
//! 1. CORS → 2. Audit logger → 3. Auth gate

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::api::endpoints;
use crate::api::endpoints::analyze::ANALYZE_BODY_LIMIT;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected outside the auth gate).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let cors = cors_layer(&core.config.cors_origins);
    build_router(ApiContext::new(core)).layer(cors)
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes: require a live session
    //
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Audit (on the merged tree) → Extension → Auth → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/me", get(endpoints::auth::me))
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            put(endpoints::patients::update).delete(endpoints::patients::delete),
        )
        .route(
            "/analyze",
            post(endpoints::analyze::analyze).layer(DefaultBodyLimit::max(ANALYZE_BODY_LIMIT)),
        )
        .route("/analyses", get(endpoints::analyses::list))
        .route("/analyses/:id", get(endpoints::analyses::detail))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes (no auth required)
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/session", post(endpoints::auth::create_session))
        .route("/auth/logout", post(endpoints::auth::logout))
        .with_state(ctx.clone())
        .layer(axum::Extension(ctx));

    // Audit wraps both trees so auth rejections are logged with full paths
    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
}

/// CORS policy from the configured origins. `*` allows any origin without
/// credentials; an explicit list allows credentials for those origins only.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
