//! Environment-driven configuration, read once at startup.
//!
//! Credentials that are absent default to an empty string. A missing token
//! only shows up later as a failed (or fallback) outbound call.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "ARI Detection System";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_DATABASE_PATH: &str = "ari_detect.db";
pub const DEFAULT_DB_NAME: &str = "ari_detection_db";
pub const DEFAULT_CLASSIFIER_URL: &str =
    "https://api-inference.huggingface.co/models/google/vit-base-patch16-224";
pub const DEFAULT_REPORT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_REPORT_MODEL: &str = "gpt-5";
pub const DEFAULT_AUTH_PROVIDER_URL: &str =
    "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8001";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,ari_detect_lib=debug"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// SQLite file backing the document store. `:memory:` keeps it in RAM.
    pub database_path: PathBuf,
    /// Logical database name, kept for deployment parity and logged at startup.
    pub db_name: String,
    pub classifier_url: String,
    pub classifier_token: String,
    pub report_api_url: String,
    pub report_api_key: String,
    pub report_model: String,
    pub auth_provider_url: String,
    /// Allowed CORS origins. `["*"]` allows any origin.
    pub cors_origins: Vec<String>,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind_raw = get("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        Ok(Self {
            database_path: PathBuf::from(get("DATABASE_PATH", DEFAULT_DATABASE_PATH)),
            db_name: get("DB_NAME", DEFAULT_DB_NAME),
            classifier_url: get("CLASSIFIER_URL", DEFAULT_CLASSIFIER_URL),
            classifier_token: get("HUGGINGFACE_API_TOKEN", ""),
            report_api_url: get("REPORT_API_URL", DEFAULT_REPORT_API_URL),
            report_api_key: get("EMERGENT_LLM_KEY", ""),
            report_model: get("REPORT_MODEL", DEFAULT_REPORT_MODEL),
            auth_provider_url: get("AUTH_PROVIDER_URL", DEFAULT_AUTH_PROVIDER_URL),
            cors_origins: parse_origins(&get("CORS_ORIGINS", "*")),
            bind_addr,
        })
    }

    /// Whether the database should live in memory instead of on disk.
    pub fn in_memory_database(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// Credentials stay out of logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_path", &self.database_path)
            .field("db_name", &self.db_name)
            .field("classifier_url", &self.classifier_url)
            .field("classifier_token", &redact(&self.classifier_token))
            .field("report_api_url", &self.report_api_url)
            .field("report_api_key", &redact(&self.report_api_key))
            .field("report_model", &self.report_model)
            .field("auth_provider_url", &self.auth_provider_url)
            .field("cors_origins", &self.cors_origins)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_env_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.db_name, "ari_detection_db");
        assert_eq!(config.classifier_token, "");
        assert_eq!(config.report_api_key, "");
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.bind_addr.port(), 8001);
        assert!(!config.in_memory_database());
    }

    #[test]
    fn cors_origins_split_on_commas() {
        let config =
            config_from(&[("CORS_ORIGINS", "https://a.example, https://b.example,")]).unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn invalid_bind_addr_rejected() {
        let result = config_from(&[("BIND_ADDR", "not-an-addr")]);
        assert!(matches!(result, Err(ConfigError::Invalid { key: "BIND_ADDR", .. })));
    }

    #[test]
    fn memory_database_detected() {
        let config = config_from(&[("DATABASE_PATH", ":memory:")]).unwrap();
        assert!(config.in_memory_database());
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = config_from(&[
            ("HUGGINGFACE_API_TOKEN", "hf_secret"),
            ("EMERGENT_LLM_KEY", "sk-secret"),
        ])
        .unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("hf_secret"));
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
