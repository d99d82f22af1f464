//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! AppState holds the configuration and the [`Workflow`] facade. The
//! facade owns the repository handle; handlers never touch storage
//! directly. With no `DATABASE_URL` the repository is in-memory.

use std::sync::Arc;

use crate::store::{MemoryRepository, WorkflowRepository};
use crate::workflow::Workflow;

// ── Configuration ───────────────────────────────────────────────────

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Application configuration, read once at startup.
///
/// Custom `Debug` redacts the `auth_token` and the database URL, which may
/// carry a password.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer secret. If `None`, tokens are trusted without a secret
    /// (development mode).
    pub auth_token: Option<String>,
    /// PostgreSQL URL. If `None`, the in-memory repository is used.
    pub database_url: Option<String>,
    /// Upper bound of the connection pool.
    pub max_connections: u32,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(Self::DEFAULT_PORT),
            auth_token: non_empty("AUTH_TOKEN"),
            database_url: non_empty("DATABASE_URL"),
            max_connections: non_empty("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(Self::DEFAULT_MAX_CONNECTIONS),
            log_format: non_empty("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("max_connections", &self.max_connections)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            auth_token: None,
            database_url: None,
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
            log_format: LogFormat::Text,
        }
    }
}

// ── Application State ───────────────────────────────────────────────

/// Shared application state accessible to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub workflow: Workflow,
    pub config: AppConfig,
}

impl AppState {
    /// Default configuration over a fresh in-memory repository.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), Arc::new(MemoryRepository::new()))
    }

    /// Build state from configuration and an already-connected repository.
    pub fn with_config(config: AppConfig, repo: Arc<dyn WorkflowRepository>) -> Self {
        Self {
            workflow: Workflow::new(repo),
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_empty() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 20);
        assert!(config.auth_token.is_none());
        assert!(config.database_url.is_none());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn reads_all_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "9090"),
            ("AUTH_TOKEN", "s3cret"),
            ("DATABASE_URL", "postgres://placement:pw@localhost/placement"),
            ("DATABASE_MAX_CONNECTIONS", "5"),
            ("LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(config.port, 9090);
        assert_eq!(config.auth_token.as_deref(), Some("s3cret"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "eighty"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 20);
    }

    #[test]
    fn blank_token_means_development_mode() {
        let config = AppConfig::from_lookup(lookup(&[("AUTH_TOKEN", "  ")]));
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig::from_lookup(lookup(&[
            ("AUTH_TOKEN", "s3cret"),
            ("DATABASE_URL", "postgres://placement:pw@localhost/placement"),
        ]));
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains(":pw@"));
    }
}
