//! The content provider façade.
//!
//! The conversation engine reads menus from, and writes questions to, a
//! `ContentProvider`. Every call goes to the backing store; nothing is cached.

use crate::error::ContentError;
use crate::record::{NewQuestion, Program, Question, Speaker, Talk};
use async_trait::async_trait;
use chrono::NaiveTime;
use meetup_concierge_core::ExternalUserId;
use rootcause::prelude::Report;

/// Read/write access to programs, talks, speakers and questions.
///
/// Single-record lookups return `Ok(None)` when nothing matches.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Lists all programs, ordered by event date then name.
    async fn list_programs(&self) -> Result<Vec<Program>, Report<ContentError>>;

    /// Finds a program by its display name.
    async fn find_program(&self, name: &str) -> Result<Option<Program>, Report<ContentError>>;

    /// Lists the talks of a program in stored (creation) order.
    ///
    /// An unknown program has no talks.
    async fn list_talks(&self, program: &str) -> Result<Vec<Talk>, Report<ContentError>>;

    /// Finds a talk by name within a program.
    async fn find_talk(
        &self,
        program: &str,
        name: &str,
    ) -> Result<Option<Talk>, Report<ContentError>>;

    /// Finds the first talk, in stored order, with the given name in any program.
    async fn find_talk_by_name(&self, name: &str) -> Result<Option<Talk>, Report<ContentError>>;

    /// Lists the distinct minute slots of a program's talks, ascending.
    ///
    /// Seconds are dropped, see [`crate::minute_slot`].
    async fn list_talk_times(&self, program: &str) -> Result<Vec<NaiveTime>, Report<ContentError>>;

    /// Finds the first talk, in stored order, starting in the minute slot of `time`.
    async fn find_talk_at(
        &self,
        program: &str,
        time: NaiveTime,
    ) -> Result<Option<Talk>, Report<ContentError>>;

    /// Finds a speaker by messaging-platform id.
    async fn find_speaker(
        &self,
        external_id: ExternalUserId,
    ) -> Result<Option<Speaker>, Report<ContentError>>;

    /// Stores a question for a speaker.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::RecordNotFound` if the speaker does not exist.
    async fn create_question(&self, question: NewQuestion)
    -> Result<Question, Report<ContentError>>;
}
