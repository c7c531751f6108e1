//! Centralized bot configuration.
//!
//! This module provides strongly-typed configuration for the bot, loaded
//! via the `config` crate from environment variables. Nested settings use
//! `__` as separator, e.g. `CONVERSATION__NOTIFY_SPEAKERS=false`.

use crate::error::StartupError;
use config::{ConfigError, Environment};
use rootcause::prelude::Report;
use serde::Deserialize;

/// Bot configuration.
#[derive(Debug, Deserialize)]
pub struct BotConfig {
    /// Telegram Bot API access token.
    pub telegram_bot_token: String,

    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Upper bound on pooled database connections.
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// Conversation configuration.
    #[serde(default)]
    pub conversation: ConversationConfig,
}

/// Conversation-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Whether accepted questions are forwarded to the speaker.
    #[serde(default = "default_notify_speakers")]
    pub notify_speakers: bool,

    /// Minutes without messages after which a session is dropped.
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: i64,

    /// Interval between idle-session sweeps, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_notify_speakers() -> bool {
    true
}

fn default_session_idle_minutes() -> i64 {
    120
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            notify_speakers: default_notify_speakers(),
            session_idle_minutes: default_session_idle_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
        }
    }
}

/// Sorts a `config` failure into an absent setting or an unusable one.
fn load_error(error: ConfigError) -> StartupError {
    let details = error.to_string();
    match error {
        ConfigError::NotFound(_) => StartupError::ConfigurationMissing { details },
        _ if details.contains("missing field") => StartupError::ConfigurationMissing { details },
        _ => StartupError::InvalidConfiguration { details },
    }
}

impl BotConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `StartupError::ConfigurationMissing` if a required setting is
    /// absent or blank, and `StartupError::InvalidConfiguration` if a value
    /// cannot be used.
    pub fn from_env() -> Result<Self, Report<StartupError>> {
        Self::from_environment(Environment::default())
    }

    /// Loads configuration from the given environment source.
    pub fn from_environment(environment: Environment) -> Result<Self, Report<StartupError>> {
        let config: Self = config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()
            .and_then(|built| built.try_deserialize::<Self>())
            .map_err(load_error)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Report<StartupError>> {
        if self.telegram_bot_token.trim().is_empty() {
            return Err(StartupError::ConfigurationMissing {
                details: "TELEGRAM_BOT_TOKEN is blank".to_string(),
            }
            .into());
        }
        if self.database_max_connections == 0 {
            return Err(StartupError::InvalidConfiguration {
                details: "DATABASE_MAX_CONNECTIONS must be at least 1".to_string(),
            }
            .into());
        }
        if self.conversation.session_idle_minutes <= 0 {
            return Err(StartupError::InvalidConfiguration {
                details: "CONVERSATION__SESSION_IDLE_MINUTES must be positive".to_string(),
            }
            .into());
        }
        if self.conversation.cleanup_interval_seconds == 0 {
            return Err(StartupError::InvalidConfiguration {
                details: "CONVERSATION__CLEANUP_INTERVAL_SECONDS must be positive".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
