//! Ravelry credentials and endpoints.
//!
//! Built once at process start via [`RavelryConfig::from_env`] and handed to
//! [`crate::RavelryClient::new`]; the client never reads the environment itself.

use std::fmt;

use crate::errors::RavelryError;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.ravelry.com";
/// Base URL for human-facing pattern pages; the permalink is appended.
pub const DEFAULT_LIBRARY_URL: &str = "https://www.ravelry.com/patterns/library/";

/// Basic-auth credentials and API base URL.
#[derive(Clone)]
pub struct RavelryConfig {
    pub username: String,
    pub password: String,
    pub api_url: String,
}

impl RavelryConfig {
    /// Creates a config with the default API URL.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Reads `RAVELRY_USERNAME`, `RAVELRY_PASSWORD` (required) and
    /// `RAVELRY_API_URL` (optional).
    ///
    /// # Errors
    /// [`RavelryError::MissingVar`] for absent credentials,
    /// [`RavelryError::InvalidUrl`] for a non-http(s) API URL.
    pub fn from_env() -> Result<Self, RavelryError> {
        let username = must_env("RAVELRY_USERNAME")?;
        let password = must_env("RAVELRY_PASSWORD")?;
        let mut cfg = Self::new(username, password);
        if let Ok(url) = std::env::var("RAVELRY_API_URL") {
            if !url.trim().is_empty() {
                cfg.api_url = url.trim().to_string();
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates the API URL scheme.
    pub fn validate(&self) -> Result<(), RavelryError> {
        if self.api_url.starts_with("http://") || self.api_url.starts_with("https://") {
            Ok(())
        } else {
            Err(RavelryError::InvalidUrl {
                var: "RAVELRY_API_URL",
                value: self.api_url.clone(),
            })
        }
    }
}

impl fmt::Debug for RavelryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RavelryConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("api_url", &self.api_url)
            .finish()
    }
}

fn must_env(name: &'static str) -> Result<String, RavelryError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RavelryError::MissingVar(name)),
    }
}
