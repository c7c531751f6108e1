//! The dispatch table.
//!
//! Each state owns an ordered list of routes. The engine tries the global
//! routes first, then the current state's routes; the first matcher that
//! accepts the text decides the action.

use crate::state::ConversationState;
use crate::text::{ASK_QUESTION, BACK, CANCEL_COMMAND, MAIN_MENU, PROGRAM, START_COMMAND};

/// How a route recognises a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// A bot command such as `/start`, optionally addressed as `/start@bot`.
    Command(&'static str),
    /// A menu label, matched exactly.
    Label(&'static str),
    /// Any non-empty text.
    AnyText,
}

impl Matcher {
    /// Returns true if the message text is accepted.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Command(name) => command_name(text) == Some(*name),
            Self::Label(label) => text.trim() == *label,
            Self::AnyText => !text.trim().is_empty(),
        }
    }
}

/// Extracts the command name from `/name`, `/name@bot` or `/name args`.
fn command_name(text: &str) -> Option<&str> {
    let token = text.split_whitespace().next()?;
    let command = token.strip_prefix('/')?;
    let name = command.split('@').next().unwrap_or(command);
    (!name.is_empty()).then_some(name)
}

/// What the engine does once a route matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Show the root menu.
    ShowRootMenu,
    /// Forget the conversation.
    Cancel,
    /// List programs for browsing the schedule.
    ListPrograms,
    /// List programs for routing a question.
    ListProgramsForQuestion,
    /// Store the chosen program and list its talks.
    SelectProgram,
    /// List the talks of the stored program again.
    ShowSelectedProgram,
    /// Show a talk of the stored program.
    DescribeTalk,
    /// Store the chosen program and list its talk times.
    SelectQuestionProgram,
    /// Store the chosen time and show the speaker.
    SelectTime,
    /// Ask for the question text.
    PromptQuestion,
    /// Store the question.
    SubmitQuestion,
}

/// A matcher paired with the action it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub matcher: Matcher,
    pub action: Action,
}

impl Route {
    const fn new(matcher: Matcher, action: Action) -> Self {
        Self { matcher, action }
    }
}

/// Routes available in every state.
pub const GLOBAL_ROUTES: &[Route] = &[
    Route::new(Matcher::Command(START_COMMAND), Action::ShowRootMenu),
    Route::new(Matcher::Command(CANCEL_COMMAND), Action::Cancel),
    Route::new(Matcher::Label(MAIN_MENU), Action::ShowRootMenu),
];

const MENU: &[Route] = &[
    Route::new(Matcher::Label(PROGRAM), Action::ListPrograms),
    Route::new(Matcher::Label(ASK_QUESTION), Action::ListProgramsForQuestion),
];

const PROGRAM_SCHEDULE: &[Route] = &[
    Route::new(Matcher::Label(BACK), Action::ShowSelectedProgram),
    Route::new(Matcher::AnyText, Action::SelectProgram),
];

const PROGRAM_DESCRIPTION: &[Route] = &[
    Route::new(Matcher::Label(BACK), Action::ListPrograms),
    Route::new(Matcher::AnyText, Action::DescribeTalk),
];

const EXIT_FROM_DESCRIPTION: &[Route] = &[Route::new(Matcher::Label(BACK), Action::ListPrograms)];

const CHOOSE_PROGRAM_FOR_QUESTION: &[Route] =
    &[Route::new(Matcher::AnyText, Action::SelectQuestionProgram)];

const PERFORMANCE_SPEAKERS: &[Route] = &[Route::new(Matcher::AnyText, Action::SelectTime)];

const QUESTION_FOR_SPEAKER: &[Route] = &[
    Route::new(Matcher::Label(BACK), Action::ListProgramsForQuestion),
    Route::new(Matcher::AnyText, Action::PromptQuestion),
];

const AWAITING_QUESTION: &[Route] = &[Route::new(Matcher::AnyText, Action::SubmitQuestion)];

/// Returns the routes of a state, in evaluation order.
#[must_use]
pub fn routes(state: ConversationState) -> &'static [Route] {
    match state {
        ConversationState::Menu => MENU,
        ConversationState::ProgramSchedule => PROGRAM_SCHEDULE,
        ConversationState::ProgramDescription => PROGRAM_DESCRIPTION,
        ConversationState::ExitFromDescription => EXIT_FROM_DESCRIPTION,
        ConversationState::ChooseProgramForQuestion => CHOOSE_PROGRAM_FOR_QUESTION,
        ConversationState::PerformanceSpeakers => PERFORMANCE_SPEAKERS,
        ConversationState::QuestionForSpeaker => QUESTION_FOR_SPEAKER,
        ConversationState::AwaitingQuestion => AWAITING_QUESTION,
        ConversationState::Ended => &[],
    }
}

/// Finds the action for a message, or `None` for the default branch.
#[must_use]
pub fn resolve(state: ConversationState, text: &str) -> Option<Action> {
    GLOBAL_ROUTES
        .iter()
        .chain(routes(state))
        .find(|route| route.matcher.matches(text))
        .map(|route| route.action)
}
