//! Configuration management for the Teller portal.
//!
//! The portal reads a single JSON configuration file at `~/.teller/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Explicit config file values
//! 2. Environment variables
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `TELLER_BIND` → server.host
//! - `TELLER_PORT` → server.port
//! - `TELLER_JWT_SECRET` → auth.jwt_secret
//! - `TELLER_DB` → server.db_path
//! - `TELLER_WAREHOUSE_DB` → warehouse.db_path
//! - `COHERE_API_KEY` → generation.api_key

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".teller"),
        |dirs| dirs.home_dir().join(".teller"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address. Default: "127.0.0.1" (local only)
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the portal database (users, roles). Defaults to
    /// `<config_dir>/portal.db` when unset.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    4500
}

// ============================================================================
// Auth Configuration
// ============================================================================

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT secret. Falls back to `TELLER_JWT_SECRET` when unset.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Token expiry in seconds
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_expiry_secs: default_token_expiry(),
        }
    }
}

fn default_token_expiry() -> u64 {
    86_400
}

// ============================================================================
// Warehouse Configuration
// ============================================================================

/// Data warehouse configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Path to the warehouse snapshot database. Defaults to
    /// `<config_dir>/warehouse.db` when unset.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Maximum rows fetched per table
    #[serde(default = "default_row_limit")]
    pub row_limit: u32,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            row_limit: default_row_limit(),
        }
    }
}

fn default_row_limit() -> u32 {
    50
}

// ============================================================================
// Generation Configuration
// ============================================================================

/// Text-generation service configuration.
///
/// The retry defaults are part of the service contract: base delay 1000 ms,
/// doubling per attempt, ceiling 30000 ms, hard stop at 3 attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// API key. Falls back to `COHERE_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Total attempts per request (initial send included)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff delay in milliseconds (doubles with each retry)
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

fn default_generation_base_url() -> String {
    "https://api.cohere.ai".into()
}

fn default_generation_model() -> String {
    "command".into()
}

fn default_max_tokens() -> i64 {
    1000
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure for the portal.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub warehouse: WarehouseConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path, applying environment
    /// overrides. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = config_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("TELLER_BIND") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TELLER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(secret) = std::env::var("TELLER_JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        if let Ok(path) = std::env::var("TELLER_DB") {
            self.server.db_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("TELLER_WAREHOUSE_DB") {
            self.warehouse.db_path = Some(PathBuf::from(path));
        }
        if self.generation.api_key.is_none() {
            if let Ok(key) = std::env::var("COHERE_API_KEY") {
                if !key.is_empty() {
                    self.generation.api_key = Some(key);
                }
            }
        }
    }

    /// Resolved portal database path.
    pub fn portal_db_path(&self) -> PathBuf {
        self.server
            .db_path
            .clone()
            .unwrap_or_else(|| config_dir().join("portal.db"))
    }

    /// Resolved warehouse database path.
    pub fn warehouse_db_path(&self) -> PathBuf {
        self.warehouse
            .db_path
            .clone()
            .unwrap_or_else(|| config_dir().join("warehouse.db"))
    }
}
