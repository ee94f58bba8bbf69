//! Configuration module for pooled_httpd.
//!
//! All settings come from environment variables. Loading goes through a
//! lookup function so tests can supply a fixed set of variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use pooled_httpd::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! println!("Workers: {}", config.pool.size());
//! ```

mod error;
mod logging;
mod parse;
mod pool;
mod server;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig, DEFAULT_LOG_FILTER};
pub use parse::{parse_duration, Lookup};
pub use pool::PoolConfig;
pub use server::ServerConfig;

use crate::listener::ListenerConfig;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Worker pool configuration.
    pub pool: PoolConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&parse::process_env)
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(vars: Lookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_lookup(vars)?,
            pool: PoolConfig::from_lookup(vars)?,
            logging: LoggingConfig::from_lookup(vars)?,
        })
    }

    /// Settings for [`Listener::bind`](crate::listener::Listener::bind).
    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig::new(self.server.listen_addr)
            .with_pool_size(self.pool.size())
            .with_queue_capacity(self.pool.queue_capacity)
            .with_request_timeout(self.server.request_timeout)
            .with_backlog(self.server.backlog)
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!("  Workers: {}", self.pool.size());

        if self.pool.is_bounded() {
            info!("  Queue capacity: {}", self.pool.queue_capacity);
        } else {
            info!("  Queue capacity: unbounded");
        }

        match self.server.request_timeout {
            Some(timeout) => info!("  Request timeout: {:?}", timeout),
            None => info!("  Request timeout: disabled"),
        }

        info!("  Backlog: {}", self.server.backlog);
        info!("  Log filter: {}", self.logging.filter);
    }
}
