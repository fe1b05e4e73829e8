//! Delegated-auth provider client.
//!
//! The web client completes the provider's login flow and receives an
//! opaque `session_id`. The provider exchanges it for the user's profile
//! and a session token, which becomes the local bearer token.

use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::StatusCode;
use serde::Deserialize;

/// Timeout for the session-data exchange.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the opaque session id to the provider.
pub const SESSION_ID_HEADER: &str = "X-Session-ID";

/// Profile and token returned by the provider for a completed login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderSession {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    pub session_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Provider rejected session (status {status})")]
    Rejected { status: u16 },

    #[error("{0}")]
    Transport(String),

    #[error("Malformed provider response: {0}")]
    ResponseParsing(String),
}

pub trait IdentityProvider: Send + Sync {
    fn exchange<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<ProviderSession, IdentityError>>;
}

/// HTTP client for the provider's session-data endpoint.
pub struct HttpIdentityProvider {
    url: String,
    client: reqwest::Client,
}

impl HttpIdentityProvider {
    pub fn new(url: &str) -> Result<Self, IdentityError> {
        Self::with_timeout(url, PROVIDER_TIMEOUT)
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    async fn fetch_session(&self, session_id: &str) -> Result<ProviderSession, IdentityError> {
        let response = self
            .client
            .get(&self.url)
            .header(SESSION_ID_HEADER, session_id)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| IdentityError::ResponseParsing(e.to_string()))
    }
}

impl IdentityProvider for HttpIdentityProvider {
    fn exchange<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<ProviderSession, IdentityError>> {
        Box::pin(self.fetch_session(session_id))
    }
}

/// Mock provider for testing: knows a fixed set of session ids.
#[cfg(test)]
pub(crate) struct MockIdentityProvider {
    sessions: std::collections::HashMap<String, ProviderSession>,
    unreachable: bool,
}

#[cfg(test)]
impl MockIdentityProvider {
    pub fn new() -> Self {
        Self {
            sessions: std::collections::HashMap::new(),
            unreachable: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            sessions: std::collections::HashMap::new(),
            unreachable: true,
        }
    }

    pub fn with_session(mut self, session_id: &str, email: &str, name: &str, token: &str) -> Self {
        self.sessions.insert(
            session_id.to_string(),
            ProviderSession {
                email: email.to_string(),
                name: name.to_string(),
                picture: None,
                session_token: token.to_string(),
            },
        );
        self
    }
}

#[cfg(test)]
impl IdentityProvider for MockIdentityProvider {
    fn exchange<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<ProviderSession, IdentityError>> {
        let result = if self.unreachable {
            Err(IdentityError::Transport("connection refused".into()))
        } else {
            self.sessions
                .get(session_id)
                .cloned()
                .ok_or(IdentityError::Rejected { status: 401 })
        };
        Box::pin(async move { result })
    }
}
