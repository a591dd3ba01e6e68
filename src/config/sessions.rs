//! Session store configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Session lifetime configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// Seconds a session stays retrievable after creation
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Seconds between background sweeps of expired sessions
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl SessionsConfig {
    /// Get TTL as Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ttl_secs == 0 {
            return Err(ValidationError::InvalidSessionTtl);
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_ttl() -> u64 {
    30 * 60
}

fn default_sweep_interval() -> u64 {
    40 * 60
}
