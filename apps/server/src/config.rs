//! Server configuration
//!
//! Values are layered: built-in defaults, then an optional config file
//! (`BEDFINDER_CONFIG`, or `bedfinder.{toml,yaml,json}` in the working
//! directory), then `BEDFINDER__SECTION__KEY` environment variables.

use bedfinder_core::BedMatch;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{
    net::{SocketAddr, ToSocketAddrs},
    path::PathBuf,
};

/// Development fallback; `main` warns when it is still in use.
pub const DEFAULT_JWT_SECRET: &str = "bedfinder-development-secret-change-me";

const MIN_JWT_SECRET_BYTES: usize = 32;
/// Admin tokens live at most 30 days.
pub const MAX_TOKEN_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;
const ROTATIONS: [&str; 4] = ["daily", "hourly", "minutely", "never"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_body_size: usize,
    /// Allowed CORS origins. Empty disables CORS headers.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_request_body_size: 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    JsonFile,
    Postgres,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::JsonFile => "json_file",
            Self::Postgres => "postgres",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Document path for the `json_file` backend.
    pub path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,
    /// Populate empty hospital and admin tables at startup.
    pub seed_on_startup: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::JsonFile,
            path: Some(PathBuf::from("hospital_data.json")),
            database_url: None,
            pool_max_size: 5,
            pool_timeout_seconds: 30,
            seed_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Reject searches with malformed numeric filters instead of ignoring them.
    pub strict_filters: bool,
    pub default_bed_match: BedMatch,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_seconds: u64,
    pub issuer: String,
    pub seed_admin_username: String,
    pub seed_admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_seconds: 24 * 60 * 60,
            issuer: "bedfinder".to_string(),
            seed_admin_username: "admin".to_string(),
            seed_admin_password: "admin123".to_string(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("issuer", &self.issuer)
            .field("seed_admin_username", &self.seed_admin_username)
            .field("seed_admin_password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    /// One of `daily`, `hourly`, `minutely`, `never`.
    pub file_rotation: String,
    pub file_prefix: String,
    pub service_name: String,
    pub service_version: Option<String>,
    pub deployment_environment: String,
    pub opentelemetry_enabled: bool,
    pub otlp_endpoint: String,
    pub otlp_timeout_seconds: u64,
    pub trace_sample_ratio: f64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_rotation: "daily".to_string(),
            file_prefix: "bedfinder".to_string(),
            service_name: "bedfinder-server".to_string(),
            service_version: None,
            deployment_environment: "development".to_string(),
            opentelemetry_enabled: false,
            otlp_endpoint: "http://localhost:4317".to_string(),
            otlp_timeout_seconds: 10,
            trace_sample_ratio: 1.0,
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the optional config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let file = match std::env::var("BEDFINDER_CONFIG") {
            Ok(path) => File::with_name(&path).required(true),
            Err(_) => File::with_name("bedfinder").required(false),
        };

        Self::from_builder(
            config::Config::builder().add_source(file).add_source(
                Environment::with_prefix("BEDFINDER")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            ),
        )
    }

    /// Build from explicit sources; missing keys fall back to defaults.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        if self.server.port == 0 {
            problems.push("server.port must be non-zero".to_string());
        }
        if self.server.max_request_body_size == 0 {
            problems.push("server.max_request_body_size must be non-zero".to_string());
        }

        match self.storage.backend {
            StorageBackend::JsonFile if self.storage.path.is_none() => {
                problems.push("storage.path is required for the json_file backend".to_string())
            }
            StorageBackend::Postgres
                if self
                    .storage
                    .database_url
                    .as_deref()
                    .map_or(true, |url| url.trim().is_empty()) =>
            {
                problems.push("storage.database_url is required for the postgres backend".to_string())
            }
            _ => {}
        }
        if self.storage.pool_max_size == 0 {
            problems.push("storage.pool_max_size must be at least 1".to_string());
        }

        if self.auth.jwt_secret.trim().is_empty() {
            problems.push("auth.jwt_secret must not be empty".to_string());
        } else if self.auth.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            problems.push(format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_BYTES} bytes"
            ));
        }
        if self.auth.token_ttl_seconds == 0 {
            problems.push("auth.token_ttl_seconds must be non-zero".to_string());
        } else if self.auth.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            problems.push(format!(
                "auth.token_ttl_seconds must be at most {MAX_TOKEN_TTL_SECONDS}"
            ));
        }

        if !(0.0..=1.0).contains(&self.logging.trace_sample_ratio) {
            problems.push("logging.trace_sample_ratio must be within [0, 1]".to_string());
        }
        if !ROTATIONS.contains(&self.logging.file_rotation.as_str()) {
            problems.push(format!(
                "logging.file_rotation must be one of {}",
                ROTATIONS.join(", ")
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }

    pub fn socket_addr(&self) -> std::io::Result<SocketAddr> {
        (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    format!("no address for {}:{}", self.server.host, self.server.port),
                )
            })
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.auth.jwt_secret == DEFAULT_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Config {
        Config::from_builder(
            config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
        .unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.backend, StorageBackend::JsonFile);
        assert_eq!(config.search.default_bed_match, BedMatch::Listed);
        assert!(config.uses_default_jwt_secret());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 9000

            [search]
            strict_filters = true
            default_bed_match = "available"
            "#,
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.search.strict_filters);
        assert_eq!(config.search.default_bed_match, BedMatch::Available);
        assert_eq!(config.auth.issuer, "bedfinder");
    }

    #[test]
    fn postgres_requires_url() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Postgres;
        let err = config.validate().unwrap_err();
        assert!(err.contains("storage.database_url"));

        config.storage.database_url = Some("postgres://localhost/bedfinder".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_short_secret_and_bad_ratio() {
        let mut config = Config::default();
        config.auth.jwt_secret = "short".into();
        config.logging.trace_sample_ratio = 1.5;
        config.logging.file_rotation = "weekly".into();

        let err = config.validate().unwrap_err();
        assert!(err.contains("jwt_secret"));
        assert!(err.contains("trace_sample_ratio"));
        assert!(err.contains("file_rotation"));
    }

    #[test]
    fn token_ttl_is_bounded() {
        let mut config = Config::default();
        config.auth.token_ttl_seconds = MAX_TOKEN_TTL_SECONDS;
        assert!(config.validate().is_ok());

        config.auth.token_ttl_seconds = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.contains("auth.token_ttl_seconds must be at most"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let rendered = format!("{:?}", Config::default().auth);
        assert!(!rendered.contains(DEFAULT_JWT_SECRET));
        assert!(!rendered.contains("admin123"));
    }

    #[test]
    fn socket_addr_resolves() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 8080;
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
    }
}
