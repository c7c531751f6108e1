//! Conversation states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a user is in the menu conversation.
///
/// A fresh session starts `Ended`; `/start` enters `Menu`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Root menu: view the schedule or ask a speaker.
    Menu,
    /// Choosing a program whose schedule to show.
    ProgramSchedule,
    /// Choosing a talk within the selected program.
    ProgramDescription,
    /// Reading a talk description.
    ExitFromDescription,
    /// Choosing the program of the speaker to ask.
    ChooseProgramForQuestion,
    /// Choosing the time of the talk.
    PerformanceSpeakers,
    /// Confirming the speaker.
    QuestionForSpeaker,
    /// Waiting for the question text.
    AwaitingQuestion,
    /// No active conversation.
    #[default]
    Ended,
}

impl ConversationState {
    /// All states, in menu order.
    pub const ALL: [Self; 9] = [
        Self::Menu,
        Self::ProgramSchedule,
        Self::ProgramDescription,
        Self::ExitFromDescription,
        Self::ChooseProgramForQuestion,
        Self::PerformanceSpeakers,
        Self::QuestionForSpeaker,
        Self::AwaitingQuestion,
        Self::Ended,
    ];

    /// Returns true if no conversation is active.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Returns the snake_case name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::ProgramSchedule => "program_schedule",
            Self::ProgramDescription => "program_description",
            Self::ExitFromDescription => "exit_from_description",
            Self::ChooseProgramForQuestion => "choose_program_for_question",
            Self::PerformanceSpeakers => "performance_speakers",
            Self::QuestionForSpeaker => "question_for_speaker",
            Self::AwaitingQuestion => "awaiting_question",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
