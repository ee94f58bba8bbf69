//! Logging configuration.

use super::parse::{env_opt, env_or, Lookup};
use super::ConfigError;

/// Default tracing filter when neither LOG_LEVEL nor RUST_LOG is set.
pub const DEFAULT_LOG_FILTER: &str = "pooled_httpd=info";

/// Output format of the log subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid {
                key: "LOG_FORMAT".into(),
                message: format!("expected text or json, got '{}'", other),
            }),
        }
    }
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Service name for structured logging.
    pub service_name: String,
    /// Output format.
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: pooled_httpd=debug,access=info
    pub fn from_lookup(vars: Lookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            filter: Self::resolve_log_filter(vars),
            service_name: env_or(vars, "SERVICE_NAME", "pooled_httpd"),
            format: LogFormat::parse(&env_or(vars, "LOG_FORMAT", "text"))?,
        })
    }

    /// Priority: LOG_LEVEL > RUST_LOG > default (info)
    fn resolve_log_filter(vars: Lookup<'_>) -> String {
        if let Some(level) = env_opt(vars, "LOG_LEVEL") {
            let level = level.trim().to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("pooled_httpd={},access={}", level, level);
                }
                _ => {
                    // Logging isn't up yet
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        if let Some(filter) = env_opt(vars, "RUST_LOG") {
            return filter;
        }

        DEFAULT_LOG_FILTER.to_string()
    }
}
