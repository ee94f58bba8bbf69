//! Worker pool configuration.

use std::num::NonZeroUsize;

use super::parse::{env_opt, env_parse, Lookup};
use super::ConfigError;
use crate::listener::DEFAULT_POOL_SIZE;

/// Worker pool configuration loaded from environment.
///
/// All values are resolved at construction time.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Resolved worker count (never zero).
    size: NonZeroUsize,
    /// Queue bound, 0 = unbounded.
    pub queue_capacity: usize,
}

impl PoolConfig {
    /// Load configuration from environment variables.
    pub fn from_lookup(vars: Lookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            size: Self::parse_size(vars)?,
            queue_capacity: env_parse(vars, "QUEUE_CAPACITY", 0usize)?,
        })
    }

    /// Get worker count.
    #[inline]
    pub fn size(&self) -> usize {
        self.size.get()
    }

    /// Whether the queue is bounded.
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.queue_capacity > 0
    }

    fn parse_size(vars: Lookup<'_>) -> Result<NonZeroUsize, ConfigError> {
        let size = match env_opt(vars, "POOL_SIZE") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("auto") => num_cpus::get(),
            _ => env_parse(vars, "POOL_SIZE", DEFAULT_POOL_SIZE)?,
        };

        NonZeroUsize::new(size).ok_or_else(|| ConfigError::Invalid {
            key: "POOL_SIZE".into(),
            message: "pool size must be at least 1".into(),
        })
    }
}
