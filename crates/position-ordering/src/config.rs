//! Configuration for Position Ordering

use crate::algorithms::allocator::DEFAULT_MAX_RANK_LENGTH;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable overriding [`PositionConfig::max_rank_length`].
pub const ENV_MAX_RANK_LENGTH: &str = "POSITION_MAX_RANK_LENGTH";

/// Environment variable overriding [`PositionConfig::max_write_attempts`].
pub const ENV_MAX_WRITE_ATTEMPTS: &str = "POSITION_MAX_WRITE_ATTEMPTS";

/// Position ordering configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    /// Longest rank the allocator may produce before reporting exhaustion
    pub max_rank_length: usize,
    /// Read-compute-write cycles attempted before surfacing a conflict
    pub max_write_attempts: u32,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            max_rank_length: DEFAULT_MAX_RANK_LENGTH,
            max_write_attempts: 3,
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_rank_length must be at least 2, got {0}")]
    RankLengthTooSmall(usize),

    #[error("max_write_attempts must be at least 1")]
    NoWriteAttempts,
}

impl PositionConfig {
    /// Defaults overridden by `POSITION_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning; parsed values that fail
    /// [`validate`](Self::validate) are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_RANK_LENGTH) {
            match raw.parse() {
                Ok(len) => config.max_rank_length = len,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_MAX_RANK_LENGTH),
            }
        }
        if let Some(raw) = lookup(ENV_MAX_WRITE_ATTEMPTS) {
            match raw.parse() {
                Ok(attempts) => config.max_write_attempts = attempts,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_MAX_WRITE_ATTEMPTS),
            }
        }

        config.validate()?;
        info!(
            max_rank_length = config.max_rank_length,
            max_write_attempts = config.max_write_attempts,
            "Loaded position ordering config"
        );
        Ok(config)
    }

    /// Reject values the manager cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // A rebalanced parent needs at least one symbol of headroom.
        if self.max_rank_length < 2 {
            return Err(ConfigError::RankLengthTooSmall(self.max_rank_length));
        }
        if self.max_write_attempts == 0 {
            return Err(ConfigError::NoWriteAttempts);
        }
        Ok(())
    }
}
