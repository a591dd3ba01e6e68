//! Runtime settings for the voteish binary.
//!
//! Values come from `VOTEISH__<SECTION>__<KEY>` environment variables (a
//! `.env` file is honoured in development). Every key has a default.
//!
//! ```no_run
//! use voteish::config::AppConfig;
//!
//! let config = AppConfig::load().unwrap();
//! config.validate().unwrap();
//! let store_ttl = config.sessions.ttl();
//! ```

mod error;
mod logging;
mod sessions;
mod voting;

pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use sessions::SessionsConfig;
pub use voting::VotingConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Session lifetime (TTL, sweep interval)
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Vote options
    #[serde(default)]
    pub voting: VotingConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads the environment into typed sections.
    ///
    /// - `VOTEISH__SESSIONS__TTL_SECS=900` -> `sessions.ttl_secs = 900`
    /// - `VOTEISH__VOTING__DECK=1,2,4,8` -> `voting.deck = "1,2,4,8"`
    /// - `VOTEISH__LOGGING__FORMAT=json` -> `logging.format = json`
    ///
    /// Fails only when a value cannot be parsed into its field type; range
    /// checks live in [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("VOTEISH")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Checks every section, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.sessions.validate()?;
        self.voting.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
