//! Content records.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use meetup_concierge_core::{ExternalUserId, ProgramId, QuestionId, SpeakerId, TalkId};
use serde::{Deserialize, Serialize};

/// Display format for talk times on buttons and in listings.
const TIME_FORMAT: &str = "%H:%M";

/// A named track of talks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Program ID.
    pub id: ProgramId,
    /// Unique display name.
    pub name: String,
    /// The day the program runs.
    pub event_date: NaiveDate,
}

/// A person who gives talks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    /// Speaker ID.
    pub id: SpeakerId,
    /// Messaging-platform id, unique per speaker.
    pub external_id: ExternalUserId,
    /// Display name.
    pub full_name: String,
}

/// A scheduled presentation within a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talk {
    /// Talk ID.
    pub id: TalkId,
    /// The program this talk belongs to.
    pub program_id: ProgramId,
    /// Talk title.
    pub name: String,
    /// Start time within the program's day.
    pub scheduled_at: NaiveTime,
    /// Free-text description.
    pub description: String,
    /// The speaker giving the talk.
    pub speaker: Speaker,
}

impl Talk {
    /// Returns the start time formatted for display.
    #[must_use]
    pub fn time_label(&self) -> String {
        format_time(self.scheduled_at)
    }
}

/// A question submitted to a speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question ID.
    pub id: QuestionId,
    /// Who asked.
    pub asker: ExternalUserId,
    /// The question text.
    pub body: String,
    /// The speaker the question is addressed to.
    pub speaker_id: SpeakerId,
    /// When the question was submitted.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a question.
///
/// The speaker is referenced by external id and resolved by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub asker: ExternalUserId,
    pub body: String,
    pub speaker: ExternalUserId,
}

impl NewQuestion {
    /// Builds a question record once the speaker has been resolved.
    #[must_use]
    pub fn into_question(self, speaker_id: SpeakerId) -> Question {
        Question {
            id: QuestionId::new(),
            asker: self.asker,
            body: self.body,
            speaker_id,
            created_at: Utc::now(),
        }
    }
}

/// Formats a talk time the way it is shown to attendees.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Truncates a time to its minute slot.
///
/// Attendees pick talks by `HH:MM`, so two start times within the same
/// minute are the same slot.
#[must_use]
pub fn minute_slot(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Parses a talk time typed or tapped by an attendee.
///
/// Accepts `HH:MM` and `HH:MM:SS`.
#[must_use]
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}
