//! Client configuration.
//!
//! The configuration is read from the provider block of the user's
//! configuration (delivered by the plugin host as JSON), then selected fields
//! can be overridden from the environment:
//!
//! - `CLOUD_OPERATION_ENDPOINT`: operation service endpoint
//! - `CLOUD_OPERATION_POLL_INTERVAL`: default poll interval in seconds
//!
//! ```
//! use cloud_operation_sdk::config::ClientConfig;
//! use serde_json::json;
//!
//! let config = ClientConfig::from_value(json!({
//!     "endpoint": "https://operation.api.example.net:443",
//!     "operation_timeout_secs": 1800
//! })).unwrap();
//! assert_eq!(config.poll_interval_secs, 1);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;
use crate::error::ConfigError;

/// Environment variable overriding [`ClientConfig::endpoint`].
pub const ENDPOINT_ENV: &str = "CLOUD_OPERATION_ENDPOINT";

/// Environment variable overriding [`ClientConfig::poll_interval_secs`].
pub const POLL_INTERVAL_ENV: &str = "CLOUD_OPERATION_POLL_INTERVAL";

/// Longest accepted [`ClientConfig::operation_timeout_secs`] (30 days).
pub const MAX_OPERATION_TIMEOUT_SECS: u64 = 30 * 24 * 60 * 60;

/// Settings for talking to the operation service and waiting on operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Operation service endpoint, including scheme.
    pub endpoint: String,
    /// Timeout for establishing the connection.
    pub connect_timeout_secs: u64,
    /// Timeout for each individual RPC.
    pub request_timeout_secs: u64,
    /// Default delay between polls when the service gives no hint.
    pub poll_interval_secs: u64,
    /// Upper bound on waiting for one operation. `None` waits indefinitely.
    pub operation_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://operation.api.cloud.local:443".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
            poll_interval_secs: 1,
            operation_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Deserialize from the provider's JSON configuration. Missing fields take
    /// their defaults; unknown fields are rejected.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            self.endpoint = endpoint;
        }
        if let Some(raw) = lookup(POLL_INTERVAL_ENV) {
            self.poll_interval_secs = raw.parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    POLL_INTERVAL_ENV, raw
                ))
            })?;
        }
        Ok(self)
    }

    /// Check the configuration, reporting problems as diagnostics.
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if self.endpoint.is_empty() {
            diagnostics.push(
                Diagnostic::error("Missing endpoint")
                    .with_detail("the operation service endpoint must be set")
                    .with_attribute("endpoint"),
            );
        } else if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://"))
        {
            diagnostics.push(
                Diagnostic::error("Invalid endpoint")
                    .with_detail(format!(
                        "endpoint {:?} must start with http:// or https://",
                        self.endpoint
                    ))
                    .with_attribute("endpoint"),
            );
        } else if self.endpoint.starts_with("http://") {
            diagnostics.push(
                Diagnostic::warning("Insecure endpoint")
                    .with_detail("operation calls will not be encrypted")
                    .with_attribute("endpoint"),
            );
        }

        if self.request_timeout_secs == 0 {
            diagnostics.push(
                Diagnostic::error("Invalid request timeout")
                    .with_detail("request_timeout_secs must be greater than zero")
                    .with_attribute("request_timeout_secs"),
            );
        }

        match self.operation_timeout_secs {
            Some(0) => diagnostics.push(
                Diagnostic::error("Invalid operation timeout")
                    .with_detail("operation_timeout_secs must be greater than zero or unset")
                    .with_attribute("operation_timeout_secs"),
            ),
            Some(secs) if secs > MAX_OPERATION_TIMEOUT_SECS => diagnostics.push(
                Diagnostic::error("Invalid operation timeout")
                    .with_detail(format!(
                        "operation_timeout_secs must be at most {}, got {}",
                        MAX_OPERATION_TIMEOUT_SECS, secs
                    ))
                    .with_attribute("operation_timeout_secs"),
            ),
            _ => {}
        }

        diagnostics
    }

    /// Default poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Upper bound on waiting for one operation.
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_secs.map(Duration::from_secs)
    }
}
