//! Server (listening socket) configuration.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use super::parse::{env_duration, env_or, env_parse, Lookup};
use super::ConfigError;
use crate::listener::{DEFAULT_BACKLOG, DEFAULT_PORT};

/// Server configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:3000).
    pub listen_addr: SocketAddr,
    /// Per-connection read/write timeout (default: 5s, "off" disables).
    pub request_timeout: Option<Duration>,
    /// listen(2) backlog (default: 1024).
    pub backlog: i32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_lookup(vars: Lookup<'_>) -> Result<Self, ConfigError> {
        let host_raw = env_or(vars, "LISTEN_HOST", "0.0.0.0");
        let host: IpAddr = host_raw.trim().parse().map_err(|e| ConfigError::Parse {
            key: "LISTEN_HOST".into(),
            value: host_raw.clone(),
            error: format!("{}", e),
        })?;

        let port: u16 = env_parse(vars, "PORT", DEFAULT_PORT)?;
        if port == 0 {
            return Err(ConfigError::Invalid {
                key: "PORT".into(),
                message: "port must be between 1 and 65535".into(),
            });
        }

        let backlog: i32 = env_parse(vars, "LISTEN_BACKLOG", DEFAULT_BACKLOG)?;
        if backlog < 1 {
            return Err(ConfigError::Invalid {
                key: "LISTEN_BACKLOG".into(),
                message: "backlog must be at least 1".into(),
            });
        }

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            request_timeout: env_duration(vars, "REQUEST_TIMEOUT", "5s")?,
            backlog,
        })
    }
}
