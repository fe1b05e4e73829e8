//! Shared application state.
//!
//! `CoreState` holds the store handle, the configuration and the three
//! outbound collaborators. It is built once at startup, wrapped in an
//! `Arc` by the API layer and handed to every request.

use crate::auth::{HttpIdentityProvider, IdentityProvider};
use crate::config::AppConfig;
use crate::db::{self, Database};
use crate::pipeline::{ChatCompletionsClient, HttpImageClassifier, ImageClassifier, ReportGenerator};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub config: AppConfig,
    db: Database,
    classifier: Box<dyn ImageClassifier>,
    reporter: Box<dyn ReportGenerator>,
    identity: Box<dyn IdentityProvider>,
}

impl CoreState {
    pub fn new(
        config: AppConfig,
        db: Database,
        classifier: Box<dyn ImageClassifier>,
        reporter: Box<dyn ReportGenerator>,
        identity: Box<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config,
            db,
            classifier,
            reporter,
            identity,
        }
    }

    /// Open the store and build the HTTP clients described by `config`.
    pub fn from_config(config: AppConfig) -> Result<Self, CoreError> {
        let db = if config.in_memory_database() {
            Database::open_in_memory()?
        } else {
            Database::open(&config.database_path)?
        };
        tracing::info!(
            db_name = %config.db_name,
            path = %config.database_path.display(),
            "Database ready"
        );

        let classifier = HttpImageClassifier::new(&config.classifier_url, &config.classifier_token)
            .map_err(|e| CoreError::HttpClient(e.to_string()))?;
        let reporter = ChatCompletionsClient::new(
            &config.report_api_url,
            &config.report_api_key,
            &config.report_model,
        )
        .map_err(|e| CoreError::HttpClient(e.to_string()))?;
        let identity = HttpIdentityProvider::new(&config.auth_provider_url)
            .map_err(|e| CoreError::HttpClient(e.to_string()))?;

        Ok(Self::new(
            config,
            db,
            Box::new(classifier),
            Box::new(reporter),
            Box::new(identity),
        ))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn classifier(&self) -> &dyn ImageClassifier {
        self.classifier.as_ref()
    }

    pub fn reporter(&self) -> &dyn ReportGenerator {
        self.reporter.as_ref()
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    /// Release the store. Requests arriving afterwards fail with `Closed`.
    pub fn shutdown(&self) -> Result<(), CoreError> {
        self.db.close()?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

/// Errors from CoreState construction and teardown.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

// ═══════════════════════════════════════════════════════════
// Test support
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "DATABASE_PATH" => Some(":memory:".to_string()),
        "BIND_ADDR" => Some("127.0.0.1:0".to_string()),
        _ => None,
    })
    .unwrap()
}

/// In-memory state wired to the given mocks.
#[cfg(test)]
pub(crate) fn test_state(
    classifier: impl ImageClassifier + 'static,
    reporter: impl ReportGenerator + 'static,
    identity: impl IdentityProvider + 'static,
) -> CoreState {
    CoreState::new(
        test_config(),
        Database::open_in_memory().unwrap(),
        Box::new(classifier),
        Box::new(reporter),
        Box::new(identity),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::provider::MockIdentityProvider;
    use crate::pipeline::classifier::MockClassifier;
    use crate::pipeline::report::MockReportGenerator;

    #[test]
    fn from_config_opens_memory_store() {
        let state = CoreState::from_config(test_config()).unwrap();
        let one: i64 = state
            .db()
            .with_conn(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(one, 1);
    }

    #[test]
    fn from_config_opens_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ari.db");
        let mut config = test_config();
        config.database_path = path.clone();

        let state = CoreState::from_config(config).unwrap();
        state.shutdown().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn shutdown_closes_store() {
        let state = test_state(
            MockClassifier::returning(vec![]),
            MockReportGenerator::new("r"),
            MockIdentityProvider::new(),
        );
        state.shutdown().unwrap();
        let result = state.db().with_conn(|_| Ok(()));
        assert!(matches!(result, Err(db::DatabaseError::Closed)));
    }

    #[test]
    fn core_error_display() {
        let err = CoreError::HttpClient("tls backend missing".into());
        assert_eq!(err.to_string(), "HTTP client error: tls backend missing");

        let err = CoreError::from(db::DatabaseError::Closed);
        assert_eq!(err.to_string(), "Database error: Database is closed");
    }
}
