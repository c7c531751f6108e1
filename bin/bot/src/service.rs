//! Message handling service.
//!
//! Ties the engine to session storage: one call loads the sender's
//! session, runs the engine and persists the result. Calls for the same
//! user are serialized, since a user may write from several chats at once.

use meetup_concierge_content::ContentProvider;
use meetup_concierge_conversation::{ConversationError, Engine, Outcome, SessionStore};
use meetup_concierge_core::ExternalUserId;
use rootcause::prelude::Report;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Number of lock stripes users are spread over.
const USER_LOCK_STRIPES: usize = 64;

/// Service handling one incoming message per call.
pub struct ConversationService<C, S> {
    engine: Engine<C>,
    sessions: Arc<S>,
    notify_speakers: bool,
    user_locks: Vec<Mutex<()>>,
}

impl<C, S> ConversationService<C, S>
where
    C: ContentProvider,
    S: SessionStore,
{
    /// Creates a new service.
    pub fn new(engine: Engine<C>, sessions: Arc<S>, notify_speakers: bool) -> Self {
        Self {
            engine,
            sessions,
            notify_speakers,
            user_locks: (0..USER_LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    fn user_lock(&self, user_id: ExternalUserId) -> &Mutex<()> {
        let stripe = user_id.get().rem_euclid(USER_LOCK_STRIPES as i64) as usize;
        &self.user_locks[stripe]
    }

    /// Handles a text message from a user.
    ///
    /// Sessions that end are removed from the store; all others are saved.
    /// If the engine fails, the stored session is left as it was.
    ///
    /// # Errors
    ///
    /// Returns `ConversationError::SessionUnavailable` if the session store
    /// fails, or whatever the engine reports.
    #[instrument(skip(self, text))]
    pub async fn process(
        &self,
        user_id: ExternalUserId,
        text: &str,
    ) -> Result<Outcome, Report<ConversationError>> {
        let session_unavailable = |details: String| ConversationError::SessionUnavailable {
            user_id,
            details,
        };

        // Held until the session is written back.
        let _guard = self.user_lock(user_id).lock().await;

        let mut session = self
            .sessions
            .load(user_id)
            .await
            .map_err(|e| session_unavailable(e.to_string()))?;

        let mut outcome = self.engine.handle(&mut session, text).await?;

        if session.state.is_ended() {
            self.sessions
                .remove(user_id)
                .await
                .map_err(|e| session_unavailable(e.to_string()))?;
        } else {
            self.sessions
                .save(session)
                .await
                .map_err(|e| session_unavailable(e.to_string()))?;
        }

        if !self.notify_speakers && !outcome.notices.is_empty() {
            debug!(
                dropped = outcome.notices.len(),
                "Speaker notifications disabled"
            );
            outcome.notices.clear();
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
    use meetup_concierge_content::MemoryContent;
    use meetup_concierge_conversation::{
        ConversationState, InMemorySessionStore, Session, SessionError,
    };

    const ADA: ExternalUserId = ExternalUserId::new(1001);
    const ATTENDEE: ExternalUserId = ExternalUserId::new(7);

    fn content() -> Arc<MemoryContent> {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        let at = NaiveTime::from_hms_opt(18, 0, 0).expect("valid time");
        let content = MemoryContent::builder()
            .program("Track A", day)
            .speaker(ADA, "Ada Lovelace")
            .talk("Track A", "Engines", at, "Analytical engines.", ADA)
            .build()
            .expect("valid content");
        Arc::new(content)
    }

    fn service(
        notify_speakers: bool,
    ) -> (
        ConversationService<MemoryContent, InMemorySessionStore>,
        Arc<MemoryContent>,
        Arc<InMemorySessionStore>,
    ) {
        let content = content();
        let sessions = Arc::new(InMemorySessionStore::new());
        let service = ConversationService::new(
            Engine::new(Arc::clone(&content)),
            Arc::clone(&sessions),
            notify_speakers,
        );
        (service, content, sessions)
    }

    async fn ask(
        service: &ConversationService<MemoryContent, InMemorySessionStore>,
        body: &str,
    ) -> Outcome {
        for text in ["/start", "Ask a question", "Track A", "18:00", "Ada Lovelace"] {
            service.process(ATTENDEE, text).await.expect("handled");
        }
        service.process(ATTENDEE, body).await.expect("handled")
    }

    #[tokio::test]
    async fn state_persists_between_messages() {
        let (service, _, sessions) = service(true);

        service.process(ATTENDEE, "/start").await.expect("handled");
        service.process(ATTENDEE, "Program").await.expect("handled");

        let session = sessions.load(ATTENDEE).await.expect("loaded");
        assert_eq!(session.state, ConversationState::ProgramSchedule);
    }

    #[tokio::test]
    async fn ended_sessions_are_removed() {
        let (service, _, sessions) = service(true);

        service.process(ATTENDEE, "/start").await.expect("handled");
        assert_eq!(sessions.len().await, 1);

        service.process(ATTENDEE, "/cancel").await.expect("handled");
        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn submitted_question_notifies_speaker() {
        let (service, content, sessions) = service(true);

        let outcome = ask(&service, "How fast is it?").await;

        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].recipient, ADA);
        assert!(outcome.notices[0].text.contains("How fast is it?"));
        assert_eq!(content.questions().await.len(), 1);
        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn notices_are_dropped_when_disabled() {
        let (service, content, _) = service(false);

        let outcome = ask(&service, "How fast is it?").await;

        assert!(outcome.notices.is_empty());
        assert_eq!(content.questions().await.len(), 1);
    }

    /// Yields before every load so concurrent calls can interleave.
    struct YieldingStore(InMemorySessionStore);

    #[async_trait]
    impl SessionStore for YieldingStore {
        async fn load(&self, user_id: ExternalUserId) -> Result<Session, Report<SessionError>> {
            tokio::task::yield_now().await;
            self.0.load(user_id).await
        }

        async fn save(&self, session: Session) -> Result<(), Report<SessionError>> {
            self.0.save(session).await
        }

        async fn remove(&self, user_id: ExternalUserId) -> Result<(), Report<SessionError>> {
            self.0.remove(user_id).await
        }

        async fn purge_idle(&self, cutoff: DateTime<Utc>) -> Result<usize, Report<SessionError>> {
            self.0.purge_idle(cutoff).await
        }
    }

    #[tokio::test]
    async fn concurrent_messages_from_one_user_are_serialized() {
        let sessions = Arc::new(YieldingStore(InMemorySessionStore::new()));
        let service =
            ConversationService::new(Engine::new(content()), Arc::clone(&sessions), true);
        service.process(ATTENDEE, "/start").await.expect("handled");

        let (program, track) = tokio::join!(
            service.process(ATTENDEE, "Program"),
            service.process(ATTENDEE, "Track A"),
        );
        program.expect("handled");
        let outcome = track.expect("handled");

        let session = sessions.load(ATTENDEE).await.expect("loaded");
        assert_eq!(session.state, ConversationState::ProgramDescription);
        assert_eq!(session.selection.program.as_deref(), Some("Track A"));
        assert!(outcome.reply.text.contains("Engines"));
    }

    struct BrokenStore;

    #[async_trait]
    impl SessionStore for BrokenStore {
        async fn load(&self, _: ExternalUserId) -> Result<Session, Report<SessionError>> {
            Err(SessionError::StorageFailed {
                reason: "unreachable".to_string(),
            }
            .into())
        }

        async fn save(&self, _: Session) -> Result<(), Report<SessionError>> {
            Ok(())
        }

        async fn remove(&self, _: ExternalUserId) -> Result<(), Report<SessionError>> {
            Ok(())
        }

        async fn purge_idle(&self, _: DateTime<Utc>) -> Result<usize, Report<SessionError>> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn session_store_failure_is_reported() {
        let service = ConversationService::new(Engine::new(content()), Arc::new(BrokenStore), true);

        let err = service.process(ATTENDEE, "/start").await.unwrap_err();

        assert!(err.to_string().contains("session unavailable for user 7"));
    }
}
