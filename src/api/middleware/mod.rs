//! API middleware stack.
//!
//! Execution order on protected routes (outermost → innermost):
//! 1. Audit logger: sees every response, including auth rejections
//! 2. Auth gate: resolves the bearer token to a doctor

pub mod audit;
pub mod auth;
