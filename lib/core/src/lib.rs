//! Core domain types for the meetup-concierge bot.
//!
//! Identifier types shared by the content, conversation and bot crates.

pub mod id;

pub use id::{ExternalUserId, ParseIdError, ProgramId, QuestionId, SpeakerId, TalkId};
