//! HTTP Server Configuration
//!
//! Bind address, database location, static file root, CORS and token
//! settings. Loaded from an optional JSON file; every field has a default
//! except the signing secret.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::JwtConfig;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database file (default: "database.json")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory served under /app (default: ".")
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// CORS allowed origins (default: empty, meaning permissive)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Token signing secret
    #[serde(default, skip_serializing)]
    pub jwt_secret: Option<String>,

    /// Default and maximum token lifetime in seconds (default: 24h)
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_path() -> PathBuf {
    PathBuf::from("database.json")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Longest token lifetime a config may ask for (one year)
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

fn default_token_ttl_secs() -> i64 {
    24 * 60 * 60
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            static_dir: default_static_dir(),
            cors_origins: Vec::new(),
            jwt_secret: None,
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Parse a JSON config document
    pub fn from_json(content: &str) -> Result<Self, String> {
        let config: HttpServerConfig =
            serde_json::from_str(content).map_err(|e| format!("Invalid config JSON: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        Self::from_json(&content)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if self.token_ttl_secs <= 0 || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(format!(
                "token_ttl_secs must be in 1..={}",
                MAX_TOKEN_TTL_SECS
            ));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err("database_path must not be empty".to_string());
        }
        if matches!(&self.jwt_secret, Some(s) if s.is_empty()) {
            return Err("jwt_secret must not be empty".to_string());
        }
        Ok(())
    }

    /// Token settings, if a secret is configured
    pub fn jwt_config(&self) -> Option<JwtConfig> {
        let secret = self.jwt_secret.as_ref()?;
        let ttl = chrono::Duration::seconds(self.token_ttl_secs.clamp(1, MAX_TOKEN_TTL_SECS));
        Some(JwtConfig {
            secret: secret.clone(),
            default_ttl: ttl,
            max_ttl: ttl,
        })
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
