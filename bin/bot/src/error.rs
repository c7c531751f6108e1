//! Domain error types for the bot binary.

use std::fmt;

/// Errors that stop the bot before it starts polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// A required setting is absent from the environment.
    ConfigurationMissing { details: String },
    /// A setting is present but unusable.
    InvalidConfiguration { details: String },
    /// The database could not be reached.
    DatabaseUnavailable { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationMissing { details } => {
                write!(f, "required configuration missing: {}", details)
            }
            Self::InvalidConfiguration { details } => {
                write!(f, "invalid configuration: {}", details)
            }
            Self::DatabaseUnavailable { details } => {
                write!(f, "database unavailable: {}", details)
            }
        }
    }
}

impl std::error::Error for StartupError {}
