//! Doctor authentication: delegated session exchange and bearer-token gate.

pub mod bridge;
pub mod gate;
pub mod provider;

pub use bridge::*;
pub use gate::*;
pub use provider::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid session ID")]
    InvalidSession,

    #[error("Auth service error: {0}")]
    Service(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
