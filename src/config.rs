//! Server configuration loaded from the environment.
//!
//! `.env` files are honoured because `main` calls `dotenvy::dotenv()` before
//! anything reads the environment. Remote-model settings live with the client
//! builder in [`crate::remote`].

use anyhow::{Context, Result};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 4000;

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default request body limit for uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Reads `HOST`, `PORT` and `MAX_UPLOAD_BYTES`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = get("HOST").unwrap_or(defaults.host);
        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {raw}"))?,
            None => defaults.port,
        };
        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid MAX_UPLOAD_BYTES value: {raw}"))?,
            None => defaults.max_upload_bytes,
        };

        Ok(Self {
            host,
            port,
            max_upload_bytes,
        })
    }
}
