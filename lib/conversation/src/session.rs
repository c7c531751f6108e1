//! Conversation session management.
//!
//! A session holds one user's conversation state and the menu choices made
//! so far. Sessions are transient: they live in a [`SessionStore`] and are
//! lost on restart.

use crate::error::SessionError;
use crate::state::ConversationState;
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use meetup_concierge_core::ExternalUserId;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Menu choices accumulated during a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Name of the chosen program.
    pub program: Option<String>,
    /// Chosen talk time, in the question flow.
    pub time: Option<NaiveTime>,
    /// External id of the speaker shown for confirmation.
    pub speaker: Option<ExternalUserId>,
}

/// A user's conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The user who owns this session.
    pub user_id: ExternalUserId,
    /// Current conversation state.
    pub state: ConversationState,
    /// Choices made so far.
    pub selection: Selection,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session last handled a message.
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session for a user.
    #[must_use]
    pub fn new(user_id: ExternalUserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            state: ConversationState::Ended,
            selection: Selection::default(),
            created_at: now,
            last_active_at: now,
        }
    }

    /// Moves the session to a new state.
    pub fn transition(&mut self, state: ConversationState) {
        self.state = state;
        self.last_active_at = Utc::now();
    }

    /// Ends the conversation and forgets every choice.
    pub fn end(&mut self) {
        self.selection = Selection::default();
        self.transition(ConversationState::Ended);
    }

    /// Returns true if the session has been idle since before `cutoff`.
    #[must_use]
    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_active_at < cutoff
    }
}

/// Trait for session storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a user's session, creating a fresh one if none exists.
    async fn load(&self, user_id: ExternalUserId) -> Result<Session, Report<SessionError>>;

    /// Stores a session, replacing any previous one for the same user.
    async fn save(&self, session: Session) -> Result<(), Report<SessionError>>;

    /// Removes a user's session.
    async fn remove(&self, user_id: ExternalUserId) -> Result<(), Report<SessionError>>;

    /// Removes sessions idle since before `cutoff`; returns how many were removed.
    async fn purge_idle(&self, cutoff: DateTime<Utc>) -> Result<usize, Report<SessionError>>;
}

/// Session store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<ExternalUserId, Session>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Returns whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, user_id: ExternalUserId) -> Result<Session, Report<SessionError>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Session::new(user_id)))
    }

    async fn save(&self, session: Session) -> Result<(), Report<SessionError>> {
        self.sessions.lock().await.insert(session.user_id, session);
        Ok(())
    }

    async fn remove(&self, user_id: ExternalUserId) -> Result<(), Report<SessionError>> {
        self.sessions.lock().await.remove(&user_id);
        Ok(())
    }

    async fn purge_idle(&self, cutoff: DateTime<Utc>) -> Result<usize, Report<SessionError>> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle_since(cutoff));
        Ok(before - sessions.len())
    }
}
