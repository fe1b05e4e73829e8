//! API endpoint handlers.
//!
//! Handlers are thin: extract, call the registry or pipeline, map errors.

pub mod analyses;
pub mod analyze;
pub mod auth;
pub mod health;
pub mod patients;
