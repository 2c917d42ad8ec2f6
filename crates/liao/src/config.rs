//! Application configuration.
//!
//! Defaults are embedded; a TOML file and `LIAO_*` environment variables can
//! override them (e.g. `LIAO_SERVER__PORT=8080`, `LIAO_AUTH__JWT_SECRET=...`).

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub stream: StreamConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite file. `None` selects the in-memory store, which is
    /// wiped on every restart.
    pub path: Option<PathBuf>,
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret for issued tokens.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Verification code lifetime in seconds.
    pub code_ttl_secs: u64,
    /// Echo the generated verification code in the send-code response.
    /// There is no SMS gateway wired up; leave this on only for development.
    pub expose_code: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-liao-dev-secret".to_string(),
            token_ttl_secs: 24 * 3600,
            code_ttl_secs: 5 * 60,
            expose_code: true,
        }
    }
}

/// Streaming reply settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Delay between emitted fragments, in milliseconds.
    pub fragment_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            fragment_delay_ms: 200,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional file plus environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(Environment::with_prefix("LIAO").separator("__"));

        let config = builder.build().context("building configuration")?;
        config
            .try_deserialize()
            .context("deserializing configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert!(config.database.path.is_none());
        assert_eq!(config.auth.code_ttl_secs, 300);
        assert_eq!(config.stream.fragment_delay_ms, 200);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9999\n\n[stream]\nfragment_delay_ms = 5"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.stream.fragment_delay_ms, 5);
        // Untouched sections keep defaults.
        assert_eq!(config.auth.token_ttl_secs, 24 * 3600);
    }
}
