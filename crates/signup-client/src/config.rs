//! Client configuration, resolved from explicit values or the environment.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_SUCCESS_DESTINATION: &str = "/marketer/dashboard";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENDPOINT_VAR: &str = "SIGNUP_ENDPOINT";
pub const SUCCESS_PATH_VAR: &str = "SIGNUP_SUCCESS_PATH";
pub const TIMEOUT_VAR: &str = "SIGNUP_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no registration endpoint configured; pass --endpoint or set SIGNUP_ENDPOINT")]
    MissingEndpoint,
    #[error("registration endpoint must be an http(s) URL, got '{0}'")]
    InvalidEndpoint(String),
    #[error("timeout must be a positive number of seconds, got '{0}'")]
    InvalidTimeout(String),
}

/// Where and how registrations are submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Route handed to the navigator when the server names none.
    pub success_destination: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ConfigError> {
        let endpoint = endpoint.into();
        let trimmed = endpoint.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(endpoint));
        }
        Ok(Self {
            endpoint: trimmed.to_string(),
            success_destination: DEFAULT_SUCCESS_DESTINATION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_success_destination(mut self, destination: impl Into<String>) -> Self {
        self.success_destination = destination.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds a config from explicit overrides, falling back to `lookup` for
    /// anything not given.
    pub fn resolve(
        endpoint: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let endpoint = endpoint
            .or_else(|| lookup(ENDPOINT_VAR))
            .ok_or(ConfigError::MissingEndpoint)?;
        let mut config = Self::new(endpoint)?;
        if let Some(path) = lookup(SUCCESS_PATH_VAR).filter(|path| !path.trim().is_empty()) {
            config.success_destination = path;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let seconds = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|seconds| *seconds > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
            config.timeout = Duration::from_secs(seconds);
        }
        Ok(config)
    }

    pub fn from_env(endpoint: Option<String>) -> Result<Self, ConfigError> {
        Self::resolve(endpoint, |key| std::env::var(key).ok())
    }
}
