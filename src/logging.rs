//! Logging and tracing setup for provider plugins.
//!
//! All logs are written to **stderr**: the plugin host owns stdout for its
//! handshake and captures stderr into its own log.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: full `tracing` filter (e.g. `cloud_operation_sdk=debug`)
//! - `TF_LOG`: the host's log level (`TRACE`, `DEBUG`, `INFO`, `WARN`,
//!   `ERROR`), used when `RUST_LOG` is not set
//!
//! ```bash
//! # Follow every poll of every operation
//! RUST_LOG=cloud_operation_sdk=trace terraform apply
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable carrying the plugin host's log level.
pub const HOST_LOG_ENV: &str = "TF_LOG";

/// Initialize logging, defaulting to `info`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with `default_level` used when neither `RUST_LOG` nor
/// the host log level is set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Useful in tests, where several cases may race to install a subscriber.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var(HOST_LOG_ENV)
            .ok()
            .and_then(|raw| host_level(&raw))
            .unwrap_or(default_level);
        EnvFilter::new(level)
    })
}

/// Map the host's log level onto a `tracing` level directive.
fn host_level(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "TRACE" | "JSON" => Some("trace"),
        "DEBUG" => Some("debug"),
        "INFO" => Some("info"),
        "WARN" => Some("warn"),
        "ERROR" => Some("error"),
        "OFF" => Some("off"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    // Note: the global subscriber can only be set once per process, so
    // initialization itself is not exercised here.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("cloud_operation_sdk=debug").is_ok());
        assert!(EnvFilter::try_new("warn,cloud_operation_sdk=trace").is_ok());
    }

    #[test]
    fn test_host_level() {
        assert_eq!(host_level("DEBUG"), Some("debug"));
        assert_eq!(host_level(" trace "), Some("trace"));
        assert_eq!(host_level("JSON"), Some("trace"));
        assert_eq!(host_level("verbose"), None);

        for level in ["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "OFF"] {
            let directive = host_level(level).unwrap();
            assert!(EnvFilter::try_new(directive).is_ok());
        }
    }
}
