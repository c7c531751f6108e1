//! The conversation engine.
//!
//! [`Engine::handle`] takes one message for one session, looks the text up
//! in the dispatch table, runs the matched action against the content
//! provider and leaves the session in its next state.
//!
//! Actions look everything up before they touch the session, so a choice
//! that does not resolve leaves the session exactly as it was and the user
//! is shown the same screen again.

use crate::error::ConversationError;
use crate::reply::{Keyboard, Outcome, Reply, SpeakerNotice};
use crate::routing::{self, Action};
use crate::session::Session;
use crate::state::ConversationState;
use crate::text;
use meetup_concierge_content::{
    ContentError, ContentProvider, NewQuestion, Program, RecordKind, Speaker, Talk, format_time,
    parse_time,
};
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Why an action could not produce its screen.
#[derive(Debug)]
enum HandlerError {
    /// The user's choice, or a stored one, does not resolve.
    NotFound { record: RecordKind, key: String },
    /// The content store failed.
    Content(Report<ContentError>),
}

impl HandlerError {
    fn not_found(record: RecordKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            record,
            key: key.into(),
        }
    }
}

impl From<Report<ContentError>> for HandlerError {
    fn from(report: Report<ContentError>) -> Self {
        Self::Content(report)
    }
}

/// Drives the menu conversation.
pub struct Engine<C> {
    content: Arc<C>,
}

impl<C> Clone for Engine<C> {
    fn clone(&self) -> Self {
        Self {
            content: Arc::clone(&self.content),
        }
    }
}

impl<C: ContentProvider> Engine<C> {
    /// Creates an engine reading from the given content provider.
    pub fn new(content: Arc<C>) -> Self {
        Self { content }
    }

    /// Handles one inbound text message.
    ///
    /// # Errors
    ///
    /// Returns `ConversationError::ContentUnavailable` if the content store
    /// fails; the session is left in its previous state.
    #[instrument(skip_all, fields(user_id = %session.user_id, state = %session.state))]
    pub async fn handle(
        &self,
        session: &mut Session,
        message: &str,
    ) -> Result<Outcome, Report<ConversationError>> {
        let Some(action) = routing::resolve(session.state, message) else {
            debug!("no route matched");
            return self.reprompt(session).await;
        };

        match self.run(action, session, message).await {
            Ok(outcome) => {
                debug!(?action, next = %session.state, "handled message");
                Ok(outcome)
            }
            Err(HandlerError::NotFound { record, key }) => {
                debug!(?action, %record, key = %key, "choice did not resolve");
                self.reprompt(session).await
            }
            Err(HandlerError::Content(report)) => Err(unavailable(session, &report)),
        }
    }

    async fn run(
        &self,
        action: Action,
        session: &mut Session,
        message: &str,
    ) -> Result<Outcome, HandlerError> {
        let choice = message.trim();
        match action {
            Action::ShowRootMenu => {
                session.transition(ConversationState::Menu);
                Ok(root_menu().into())
            }
            Action::Cancel => {
                session.end();
                Ok(Reply::remove_keyboard(text::CANCELLED).into())
            }
            Action::ListPrograms => {
                self.enter(session, ConversationState::ProgramSchedule)
                    .await
            }
            Action::ListProgramsForQuestion => {
                self.enter(session, ConversationState::ChooseProgramForQuestion)
                    .await
            }
            Action::ShowSelectedProgram => {
                self.enter(session, ConversationState::ProgramDescription)
                    .await
            }
            Action::SelectProgram => {
                let program = self.program(choice).await?;
                let reply = self.talk_menu(&program.name).await?;
                session.selection.program = Some(program.name);
                session.transition(ConversationState::ProgramDescription);
                Ok(reply.into())
            }
            Action::DescribeTalk => {
                let talk = match session.selection.program.as_deref() {
                    Some(program) => self.content.find_talk(program, choice).await?,
                    None => self.content.find_talk_by_name(choice).await?,
                }
                .ok_or_else(|| HandlerError::not_found(RecordKind::Talk, choice))?;

                session.transition(ConversationState::ExitFromDescription);
                Ok(Reply::with_keyboard(
                    text::talk_description(&talk),
                    Keyboard::chunked([text::MAIN_MENU, text::BACK], 2),
                )
                .into())
            }
            Action::SelectQuestionProgram => {
                let program = self.program(choice).await?;
                let reply = self.time_menu(&program.name).await?;
                session.selection.program = Some(program.name);
                session.selection.time = None;
                session.selection.speaker = None;
                session.transition(ConversationState::PerformanceSpeakers);
                Ok(reply.into())
            }
            Action::SelectTime => {
                let program = selected_program(session)?;
                let time = parse_time(choice)
                    .ok_or_else(|| HandlerError::not_found(RecordKind::Talk, choice))?;
                let talk = self
                    .content
                    .find_talk_at(&program, time)
                    .await?
                    .ok_or_else(|| HandlerError::not_found(RecordKind::Talk, choice))?;

                let reply = speaker_menu(&program, &talk);
                session.selection.time = Some(time);
                session.selection.speaker = Some(talk.speaker.external_id);
                session.transition(ConversationState::QuestionForSpeaker);
                Ok(reply.into())
            }
            Action::PromptQuestion => {
                self.enter(session, ConversationState::AwaitingQuestion)
                    .await
            }
            Action::SubmitQuestion => {
                let speaker = self.selected_speaker(session).await?;

                let question = self
                    .content
                    .create_question(NewQuestion {
                        asker: session.user_id,
                        body: choice.to_string(),
                        speaker: speaker.external_id,
                    })
                    .await?;
                debug!(question_id = %question.id, speaker_id = %speaker.id, "question submitted");

                session.end();
                Ok(Outcome {
                    reply: Reply::remove_keyboard(text::question_accepted(&speaker.full_name)),
                    notices: vec![SpeakerNotice {
                        recipient: speaker.external_id,
                        text: text::speaker_notice(&question.body),
                    }],
                })
            }
        }
    }

    /// Renders a state's screen and moves the session there.
    async fn enter(
        &self,
        session: &mut Session,
        state: ConversationState,
    ) -> Result<Outcome, HandlerError> {
        let reply = self.render(state, session).await?;
        session.transition(state);
        Ok(reply.into())
    }

    /// Shows the current screen again.
    ///
    /// Falls back to the root menu when the screen depends on a stored
    /// choice that no longer resolves.
    async fn reprompt(&self, session: &mut Session) -> Result<Outcome, Report<ConversationError>> {
        if session.state.is_ended() {
            return Ok(Reply::plain(text::SEND_START).into());
        }

        match self.render(session.state, session).await {
            Ok(reply) => Ok(reply.prefixed(text::CHOOSE_FROM_OPTIONS).into()),
            Err(HandlerError::NotFound { record, key }) => {
                debug!(%record, key = %key, "stored choice is stale, returning to root menu");
                session.transition(ConversationState::Menu);
                Ok(root_menu().prefixed(text::CHOOSE_FROM_OPTIONS).into())
            }
            Err(HandlerError::Content(report)) => Err(unavailable(session, &report)),
        }
    }

    /// Builds the screen shown on entering `state`, from the stored choices.
    async fn render(
        &self,
        state: ConversationState,
        session: &Session,
    ) -> Result<Reply, HandlerError> {
        match state {
            ConversationState::Menu => Ok(root_menu()),
            ConversationState::ProgramSchedule => {
                let programs = self.content.list_programs().await?;
                Ok(program_menu(text::program_listing(&programs), &programs))
            }
            ConversationState::ChooseProgramForQuestion => {
                let programs = self.content.list_programs().await?;
                Ok(program_menu(text::WHICH_PROGRAM_QUESTION.to_string(), &programs))
            }
            ConversationState::ProgramDescription => {
                let program = self.program(&selected_program(session)?).await?;
                self.talk_menu(&program.name).await
            }
            ConversationState::ExitFromDescription => Ok(Reply::with_keyboard(
                text::EXIT_DESCRIPTION,
                Keyboard::chunked([text::MAIN_MENU, text::BACK], 2),
            )),
            ConversationState::PerformanceSpeakers => {
                let program = self.program(&selected_program(session)?).await?;
                self.time_menu(&program.name).await
            }
            ConversationState::QuestionForSpeaker => {
                let program = selected_program(session)?;
                let time = session
                    .selection
                    .time
                    .ok_or_else(|| HandlerError::not_found(RecordKind::Talk, "no time selected"))?;
                let talk = self
                    .content
                    .find_talk_at(&program, time)
                    .await?
                    .ok_or_else(|| HandlerError::not_found(RecordKind::Talk, format_time(time)))?;
                Ok(speaker_menu(&program, &talk))
            }
            ConversationState::AwaitingQuestion => {
                self.selected_speaker(session).await?;
                Ok(Reply::remove_keyboard(text::ASK_YOUR_QUESTION))
            }
            ConversationState::Ended => Ok(Reply::plain(text::SEND_START)),
        }
    }

    async fn program(&self, name: &str) -> Result<Program, HandlerError> {
        self.content
            .find_program(name)
            .await?
            .ok_or_else(|| HandlerError::not_found(RecordKind::Program, name))
    }

    async fn selected_speaker(&self, session: &Session) -> Result<Speaker, HandlerError> {
        let external_id = session
            .selection
            .speaker
            .ok_or_else(|| HandlerError::not_found(RecordKind::Speaker, "none selected"))?;
        self.content
            .find_speaker(external_id)
            .await?
            .ok_or_else(|| HandlerError::not_found(RecordKind::Speaker, external_id.to_string()))
    }

    async fn talk_menu(&self, program: &str) -> Result<Reply, HandlerError> {
        let talks = self.content.list_talks(program).await?;
        let labels = talks
            .iter()
            .map(|talk| talk.name.as_str())
            .chain([text::BACK]);
        Ok(Reply::with_keyboard(
            text::talk_listing(program, &talks),
            Keyboard::chunked(labels, 2),
        ))
    }

    async fn time_menu(&self, program: &str) -> Result<Reply, HandlerError> {
        let times = self.content.list_talk_times(program).await?;
        let labels = times
            .into_iter()
            .map(format_time)
            .chain([text::MAIN_MENU.to_string()]);
        Ok(Reply::with_keyboard(
            text::WHEN_WAS_TALK,
            Keyboard::chunked(labels, 2),
        ))
    }
}

fn root_menu() -> Reply {
    Reply::with_keyboard(
        text::GREETING,
        Keyboard::chunked([text::PROGRAM, text::ASK_QUESTION], 2),
    )
}

fn program_menu(body: String, programs: &[Program]) -> Reply {
    let labels = programs
        .iter()
        .map(|program| program.name.as_str())
        .chain([text::MAIN_MENU]);
    Reply::with_keyboard(body, Keyboard::chunked(labels, 2))
}

fn speaker_menu(program: &str, talk: &Talk) -> Reply {
    Reply::with_keyboard(
        text::speaker_at(program, talk),
        Keyboard::chunked([talk.speaker.full_name.as_str(), text::BACK], 1),
    )
}

fn selected_program(session: &Session) -> Result<String, HandlerError> {
    session
        .selection
        .program
        .clone()
        .ok_or_else(|| HandlerError::not_found(RecordKind::Program, "none selected"))
}

fn unavailable(session: &Session, report: &Report<ContentError>) -> Report<ConversationError> {
    ConversationError::ContentUnavailable {
        user_id: session.user_id,
        details: report.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::ReplyMarkup;
    use crate::session::Selection;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use meetup_concierge_content::{MemoryContent, Question, Speaker};
    use meetup_concierge_core::ExternalUserId;

    const ADA: ExternalUserId = ExternalUserId::new(1001);
    const GRACE: ExternalUserId = ExternalUserId::new(1002);
    const ATTENDEE: ExternalUserId = ExternalUserId::new(7);

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    fn demo_content() -> Arc<MemoryContent> {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        let content = MemoryContent::builder()
            .program("Track A", day)
            .program("Track B", day)
            .speaker(ADA, "Ada Lovelace")
            .speaker(GRACE, "Grace Hopper")
            .talk("Track A", "Engines", at(18, 0), "Analytical engines.", ADA)
            .talk("Track A", "Compilers", at(18, 30), "Writing compilers.", GRACE)
            .talk("Track A", "Lightning", at(19, 0), "Short talks.", ADA)
            .talk("Track B", "Debugging", at(18, 0), "Finding moths.", GRACE)
            .build()
            .expect("valid content");
        Arc::new(content)
    }

    fn engine() -> (Engine<MemoryContent>, Arc<MemoryContent>) {
        let content = demo_content();
        (Engine::new(Arc::clone(&content)), content)
    }

    fn labels(outcome: &Outcome) -> Vec<String> {
        outcome
            .reply
            .keyboard()
            .map(|keyboard| keyboard.labels().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn root_rows() -> Vec<Vec<String>> {
        vec![vec!["Program".to_string(), "Ask a question".to_string()]]
    }

    async fn send(
        engine: &Engine<MemoryContent>,
        session: &mut Session,
        text: &str,
    ) -> Outcome {
        engine.handle(session, text).await.expect("handled")
    }

    #[tokio::test]
    async fn start_shows_root_menu() {
        let (engine, _) = engine();
        let mut session = Session::new(ATTENDEE);

        let outcome = send(&engine, &mut session, "/start").await;

        assert_eq!(session.state, ConversationState::Menu);
        assert_eq!(
            outcome.reply.keyboard().map(|k| k.rows().to_vec()),
            Some(root_rows())
        );
    }

    #[tokio::test]
    async fn browsing_the_schedule_end_to_end() {
        let (engine, _) = engine();
        let mut session = Session::new(ATTENDEE);

        send(&engine, &mut session, "/start").await;

        let outcome = send(&engine, &mut session, "Program").await;
        assert_eq!(session.state, ConversationState::ProgramSchedule);
        assert_eq!(labels(&outcome), ["Track A", "Track B", "Main menu"]);
        assert!(outcome.reply.text.contains("1. Track A"));

        let outcome = send(&engine, &mut session, "Track A").await;
        assert_eq!(session.state, ConversationState::ProgramDescription);
        assert_eq!(labels(&outcome), ["Engines", "Compilers", "Lightning", "Back"]);
        assert!(outcome.reply.text.contains("Time: 18:30"));

        let outcome = send(&engine, &mut session, "Compilers").await;
        assert_eq!(session.state, ConversationState::ExitFromDescription);
        assert!(outcome.reply.text.contains("Writing compilers."));
        assert!(outcome.reply.text.contains("Grace Hopper"));
        assert_eq!(
            outcome.reply.keyboard().map(|k| k.rows().to_vec()),
            Some(vec![vec!["Main menu".to_string(), "Back".to_string()]])
        );

        let outcome = send(&engine, &mut session, "Main menu").await;
        assert_eq!(session.state, ConversationState::Menu);
        assert_eq!(
            outcome.reply.keyboard().map(|k| k.rows().to_vec()),
            Some(root_rows())
        );
    }

    #[tokio::test]
    async fn main_menu_returns_to_root_from_every_state() {
        let (engine, _) = engine();

        for state in ConversationState::ALL {
            let mut session = Session::new(ATTENDEE);
            session.selection = Selection {
                program: Some("Track A".to_string()),
                time: Some(at(18, 0)),
                speaker: Some(ADA),
            };
            session.transition(state);

            let outcome = send(&engine, &mut session, "Main menu").await;

            assert_eq!(session.state, ConversationState::Menu, "from {state}");
            assert_eq!(
                outcome.reply.keyboard().map(|k| k.rows().to_vec()),
                Some(root_rows()),
                "from {state}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_talk_reprompts_without_moving() {
        let (engine, _) = engine();
        let mut session = Session::new(ATTENDEE);
        send(&engine, &mut session, "/start").await;
        send(&engine, &mut session, "Program").await;
        send(&engine, &mut session, "Track B").await;

        // "Engines" exists, but only under Track A.
        let outcome = send(&engine, &mut session, "Engines").await;

        assert_eq!(session.state, ConversationState::ProgramDescription);
        assert!(outcome.reply.text.starts_with("Please choose one of the options below."));
        assert_eq!(labels(&outcome), ["Debugging", "Back"]);
    }

    #[tokio::test]
    async fn unknown_program_reprompts_program_list() {
        let (engine, _) = engine();
        let mut session = Session::new(ATTENDEE);
        send(&engine, &mut session, "/start").await;
        send(&engine, &mut session, "Program").await;

        let outcome = send(&engine, &mut session, "Track Z").await;

        assert_eq!(session.state, ConversationState::ProgramSchedule);
        assert_eq!(session.selection.program, None);
        assert_eq!(labels(&outcome), ["Track A", "Track B", "Main menu"]);
    }

    #[tokio::test]
    async fn back_navigation_between_schedule_screens() {
        let (engine, _) = engine();
        let mut session = Session::new(ATTENDEE);
        send(&engine, &mut session, "/start").await;
        send(&engine, &mut session, "Program").await;
        send(&engine, &mut session, "Track A").await;
        send(&engine, &mut session, "Engines").await;

        let outcome = send(&engine, &mut session, "Back").await;
        assert_eq!(session.state, ConversationState::ProgramSchedule);
        assert_eq!(labels(&outcome), ["Track A", "Track B", "Main menu"]);

        let outcome = send(&engine, &mut session, "Back").await;
        assert_eq!(session.state, ConversationState::ProgramDescription);
        assert_eq!(labels(&outcome), ["Engines", "Compilers", "Lightning", "Back"]);

        let outcome = send(&engine, &mut session, "Back").await;
        assert_eq!(session.state, ConversationState::ProgramSchedule);
        assert_eq!(labels(&outcome), ["Track A", "Track B", "Main menu"]);
    }

    #[tokio::test]
    async fn question_flow_stores_one_question_for_shown_speaker() {
        let (engine, content) = engine();
        let mut session = Session::new(ATTENDEE);
        send(&engine, &mut session, "/start").await;

        let outcome = send(&engine, &mut session, "Ask a question").await;
        assert_eq!(session.state, ConversationState::ChooseProgramForQuestion);
        assert_eq!(labels(&outcome), ["Track A", "Track B", "Main menu"]);

        let outcome = send(&engine, &mut session, "Track A").await;
        assert_eq!(session.state, ConversationState::PerformanceSpeakers);
        assert_eq!(labels(&outcome), ["18:00", "18:30", "19:00", "Main menu"]);

        let outcome = send(&engine, &mut session, "18:30").await;
        assert_eq!(session.state, ConversationState::QuestionForSpeaker);
        assert_eq!(
            outcome.reply.keyboard().map(|k| k.rows().to_vec()),
            Some(vec![vec!["Grace Hopper".to_string()], vec!["Back".to_string()]])
        );

        let outcome = send(&engine, &mut session, "Grace Hopper").await;
        assert_eq!(session.state, ConversationState::AwaitingQuestion);
        assert_eq!(outcome.reply.markup, ReplyMarkup::RemoveKeyboard);
        assert!(content.questions().await.is_empty());

        let outcome = send(&engine, &mut session, "Which compiler came first?").await;
        assert!(session.state.is_ended());
        assert_eq!(session.selection, Selection::default());

        let questions: Vec<Question> = content.questions().await;
        assert_eq!(questions.len(), 1);
        let grace: Speaker = content
            .find_speaker(GRACE)
            .await
            .expect("find")
            .expect("speaker exists");
        assert_eq!(questions[0].speaker_id, grace.id);
        assert_eq!(questions[0].asker, ATTENDEE);
        assert_eq!(questions[0].body, "Which compiler came first?");

        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].recipient, GRACE);
        assert!(outcome.notices[0].text.contains("Which compiler came first?"));
    }

    #[tokio::test]
    async fn unknown_time_reprompts_time_list() {
        let (engine, _) = engine();
        let mut session = Session::new(ATTENDEE);
        send(&engine, &mut session, "/start").await;
        send(&engine, &mut session, "Ask a question").await;
        send(&engine, &mut session, "Track B").await;

        for text in ["19:00", "tonight"] {
            let outcome = send(&engine, &mut session, text).await;
            assert_eq!(session.state, ConversationState::PerformanceSpeakers);
            assert_eq!(labels(&outcome), ["18:00", "Main menu"]);
        }
    }

    #[tokio::test]
    async fn offered_time_resolves_talk_starting_mid_minute() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        let late = NaiveTime::from_hms_opt(18, 0, 30).expect("valid time");
        let content = MemoryContent::builder()
            .program("Track A", day)
            .speaker(ADA, "Ada Lovelace")
            .talk("Track A", "Engines", late, "Analytical engines.", ADA)
            .build()
            .expect("valid content");
        let engine = Engine::new(Arc::new(content));
        let mut session = Session::new(ATTENDEE);
        send(&engine, &mut session, "/start").await;
        send(&engine, &mut session, "Ask a question").await;

        let outcome = send(&engine, &mut session, "Track A").await;
        assert_eq!(labels(&outcome), ["18:00", "Main menu"]);

        let outcome = send(&engine, &mut session, "18:00").await;
        assert_eq!(session.state, ConversationState::QuestionForSpeaker);
        assert_eq!(labels(&outcome), ["Ada Lovelace", "Back"]);
    }

    #[tokio::test]
    async fn back_from_speaker_returns_to_question_programs() {
        let (engine, _) = engine();
        let mut session = Session::new(ATTENDEE);
        send(&engine, &mut session, "/start").await;
        send(&engine, &mut session, "Ask a question").await;
        send(&engine, &mut session, "Track B").await;
        send(&engine, &mut session, "18:00").await;

        let outcome = send(&engine, &mut session, "Back").await;

        assert_eq!(session.state, ConversationState::ChooseProgramForQuestion);
        assert_eq!(labels(&outcome), ["Track A", "Track B", "Main menu"]);
    }

    #[tokio::test]
    async fn cancel_ends_conversation_and_hides_keyboard() {
        let (engine, content) = engine();
        let mut session = Session::new(ATTENDEE);
        send(&engine, &mut session, "/start").await;
        send(&engine, &mut session, "Ask a question").await;
        send(&engine, &mut session, "Track A").await;

        let outcome = send(&engine, &mut session, "/cancel").await;

        assert!(session.state.is_ended());
        assert_eq!(session.selection, Selection::default());
        assert_eq!(outcome.reply.markup, ReplyMarkup::RemoveKeyboard);
        assert!(content.questions().await.is_empty());
    }

    #[tokio::test]
    async fn free_text_in_menu_reprompts_root_menu() {
        let (engine, _) = engine();
        let mut session = Session::new(ATTENDEE);
        send(&engine, &mut session, "/start").await;

        let outcome = send(&engine, &mut session, "hello?").await;

        assert_eq!(session.state, ConversationState::Menu);
        assert!(outcome.reply.text.starts_with("Please choose"));
        assert_eq!(
            outcome.reply.keyboard().map(|k| k.rows().to_vec()),
            Some(root_rows())
        );
    }

    #[tokio::test]
    async fn text_without_conversation_hints_at_start() {
        let (engine, _) = engine();
        let mut session = Session::new(ATTENDEE);

        let outcome = send(&engine, &mut session, "hello?").await;

        assert!(session.state.is_ended());
        assert!(outcome.reply.text.contains("/start"));
        assert_eq!(outcome.reply.markup, ReplyMarkup::None);
    }

    #[tokio::test]
    async fn stale_program_selection_falls_back_to_root_menu() {
        let (engine, _) = engine();
        let mut session = Session::new(ATTENDEE);
        session.selection.program = Some("Retired track".to_string());
        session.transition(ConversationState::ProgramDescription);

        let outcome = send(&engine, &mut session, "Engines").await;

        assert_eq!(session.state, ConversationState::Menu);
        assert_eq!(
            outcome.reply.keyboard().map(|k| k.rows().to_vec()),
            Some(root_rows())
        );
    }

    #[tokio::test]
    async fn state_is_always_defined_after_any_message() {
        let (engine, _) = engine();
        let inputs = [
            "/start", "nonsense", "Program", "Back", "Track A", "Nope", "Engines", "Back",
            "/cancel", "Ask a question", "Track B", "25:99", "18:00", "Back", "Track B",
            "18:00", "Grace Hopper", "Is it a bug?", "Back",
        ];
        let mut session = Session::new(ATTENDEE);

        for input in inputs {
            send(&engine, &mut session, input).await;
            assert!(ConversationState::ALL.contains(&session.state), "after {input}");
        }
    }

    struct FailingContent;

    fn failed<T>() -> Result<T, Report<ContentError>> {
        Err(ContentError::QueryFailed {
            details: "database is down".to_string(),
        }
        .into())
    }

    #[async_trait]
    impl ContentProvider for FailingContent {
        async fn list_programs(&self) -> Result<Vec<Program>, Report<ContentError>> {
            failed()
        }

        async fn find_program(&self, _: &str) -> Result<Option<Program>, Report<ContentError>> {
            failed()
        }

        async fn list_talks(&self, _: &str) -> Result<Vec<Talk>, Report<ContentError>> {
            failed()
        }

        async fn find_talk(&self, _: &str, _: &str) -> Result<Option<Talk>, Report<ContentError>> {
            failed()
        }

        async fn find_talk_by_name(&self, _: &str) -> Result<Option<Talk>, Report<ContentError>> {
            failed()
        }

        async fn list_talk_times(&self, _: &str) -> Result<Vec<NaiveTime>, Report<ContentError>> {
            failed()
        }

        async fn find_talk_at(
            &self,
            _: &str,
            _: NaiveTime,
        ) -> Result<Option<Talk>, Report<ContentError>> {
            failed()
        }

        async fn find_speaker(
            &self,
            _: ExternalUserId,
        ) -> Result<Option<Speaker>, Report<ContentError>> {
            failed()
        }

        async fn create_question(
            &self,
            _: NewQuestion,
        ) -> Result<Question, Report<ContentError>> {
            failed()
        }
    }

    #[tokio::test]
    async fn storage_failure_is_an_error_and_keeps_state() {
        let engine = Engine::new(Arc::new(FailingContent));
        let mut session = Session::new(ATTENDEE);
        engine.handle(&mut session, "/start").await.expect("root menu needs no content");

        let result = engine.handle(&mut session, "Program").await;

        assert!(result.is_err());
        assert_eq!(session.state, ConversationState::Menu);
    }
}
