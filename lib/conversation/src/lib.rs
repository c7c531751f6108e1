//! Conversation engine for the meetup-concierge bot.
//!
//! This crate provides:
//!
//! - **Engine**: The menu state machine, driven one message at a time
//! - **Routing**: The per-state dispatch table
//! - **Sessions**: Per-user conversation state and its storage
//! - **Replies**: Transport-agnostic reply text and keyboards

pub mod engine;
pub mod error;
pub mod reply;
pub mod routing;
pub mod session;
pub mod state;
pub mod text;

pub use engine::Engine;
pub use error::{ConversationError, SessionError};
pub use reply::{Keyboard, Outcome, Reply, ReplyMarkup, SpeakerNotice};
pub use session::{InMemorySessionStore, Selection, Session, SessionStore};
pub use state::ConversationState;
