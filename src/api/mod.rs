//! REST API consumed by the web client.
//!
//! Routes are nested under `/api/`. Protected routes pass through the
//! auth gate, which injects the authenticated doctor. The audit logger
//! wraps the whole tree, so rejected requests are logged as well.
//!
//! The router is composable: `api_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_server, start_server_on, ApiServer, ServerError};
pub use types::{ApiContext, DoctorContext};
