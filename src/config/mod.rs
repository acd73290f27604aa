//! Configuration module for the site backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Bootstrap admin account, created at start-up if missing
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Lifetime of an admin session token, in seconds
    pub session_ttl_secs: u64,
    /// Failed sign-ins tolerated per identifier before rate limiting
    pub max_signin_attempts: u32,
    /// How long failed sign-ins count against an identifier, in seconds
    pub signin_lockout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("SITE_DB_PATH")
            .unwrap_or_else(|_| "./data/site.sqlite".to_string())
            .into();

        let bind_addr = parse_var("SITE_BIND_ADDR", "127.0.0.1:8080")?;
        let log_level = env::var("SITE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_json = match env::var("SITE_LOG_FORMAT").as_deref() {
            Err(_) | Ok("") | Ok("text") => false,
            Ok("json") => true,
            Ok(other) => {
                return Err(ConfigError {
                    key: "SITE_LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected \"text\" or \"json\"".to_string(),
                })
            }
        };

        let admin_email = env::var("SITE_ADMIN_EMAIL").ok().filter(|s| !s.is_empty());
        let admin_password = env::var("SITE_ADMIN_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty());

        let session_ttl_secs = parse_var("SITE_SESSION_TTL_SECS", "28800")?;
        let max_signin_attempts = parse_var("SITE_MAX_SIGNIN_ATTEMPTS", "5")?;
        let signin_lockout_secs = parse_var("SITE_SIGNIN_LOCKOUT_SECS", "900")?;

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_json,
            admin_email,
            admin_password,
            session_ttl_secs,
            max_signin_attempts,
            signin_lockout_secs,
        })
    }
}

fn parse_var<T>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e: T::Err| ConfigError {
        key,
        reason: e.to_string(),
        value,
    })
}
