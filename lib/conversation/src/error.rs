//! Error types for the conversation crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `SessionError`: Errors from session storage
//! - `ConversationError`: Failures that abort handling of a message
//!
//! A program, talk, time or speaker that does not resolve is not an error
//! at this layer: the engine answers it with a re-prompt.

use meetup_concierge_core::ExternalUserId;
use std::fmt;

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Storage operation failed.
    StorageFailed { reason: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageFailed { reason } => {
                write!(f, "session storage failed: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// High-level conversation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// The content store could not answer while handling a message.
    ContentUnavailable {
        user_id: ExternalUserId,
        details: String,
    },
    /// The session store could not load or persist a session.
    SessionUnavailable {
        user_id: ExternalUserId,
        details: String,
    },
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentUnavailable { user_id, details } => {
                write!(f, "content unavailable for user {user_id}: {details}")
            }
            Self::SessionUnavailable { user_id, details } => {
                write!(f, "session unavailable for user {user_id}: {details}")
            }
        }
    }
}

impl std::error::Error for ConversationError {}
