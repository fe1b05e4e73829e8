//! Shared types for the API layer.

use std::sync::Arc;

use crate::core_state::CoreState;
use crate::models::User;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Authenticated doctor, injected into request extensions by the auth
/// middleware after the bearer token resolved to a live session.
#[derive(Debug, Clone)]
pub struct DoctorContext {
    pub user: User,
}

impl DoctorContext {
    pub fn id(&self) -> &str {
        &self.user.id
    }
}
