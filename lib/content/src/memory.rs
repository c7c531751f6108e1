//! In-memory content provider.
//!
//! Records are seeded once through [`MemoryContentBuilder`]; only questions
//! are written afterwards.

use crate::error::{ContentError, RecordKind};
use crate::provider::ContentProvider;
use crate::record::{NewQuestion, Program, Question, Speaker, Talk, minute_slot};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use meetup_concierge_core::{ExternalUserId, ProgramId, SpeakerId, TalkId};
use rootcause::prelude::Report;
use tokio::sync::Mutex;

/// A talk waiting for its program and speaker to be resolved.
#[derive(Debug, Clone)]
struct PendingTalk {
    program: String,
    name: String,
    scheduled_at: NaiveTime,
    description: String,
    speaker: ExternalUserId,
}

/// Builder for [`MemoryContent`].
#[derive(Debug, Default)]
pub struct MemoryContentBuilder {
    programs: Vec<Program>,
    speakers: Vec<Speaker>,
    talks: Vec<PendingTalk>,
}

impl MemoryContentBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a program.
    #[must_use]
    pub fn program(mut self, name: impl Into<String>, event_date: NaiveDate) -> Self {
        self.programs.push(Program {
            id: ProgramId::new(),
            name: name.into(),
            event_date,
        });
        self
    }

    /// Adds a speaker.
    #[must_use]
    pub fn speaker(mut self, external_id: ExternalUserId, full_name: impl Into<String>) -> Self {
        self.speakers.push(Speaker {
            id: SpeakerId::new(),
            external_id,
            full_name: full_name.into(),
        });
        self
    }

    /// Adds a talk, referencing its program by name and its speaker by external id.
    #[must_use]
    pub fn talk(
        mut self,
        program: impl Into<String>,
        name: impl Into<String>,
        scheduled_at: NaiveTime,
        description: impl Into<String>,
        speaker: ExternalUserId,
    ) -> Self {
        self.talks.push(PendingTalk {
            program: program.into(),
            name: name.into(),
            scheduled_at,
            description: description.into(),
            speaker,
        });
        self
    }

    /// Resolves talk references and builds the provider.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::RecordNotFound` if a talk names a program or
    /// speaker that was never added.
    pub fn build(self) -> Result<MemoryContent, Report<ContentError>> {
        let mut talks = Vec::with_capacity(self.talks.len());
        for pending in self.talks {
            let program = self
                .programs
                .iter()
                .find(|p| p.name == pending.program)
                .ok_or_else(|| ContentError::RecordNotFound {
                    record: RecordKind::Program,
                    key: pending.program.clone(),
                })?;
            let speaker = self
                .speakers
                .iter()
                .find(|s| s.external_id == pending.speaker)
                .ok_or_else(|| ContentError::RecordNotFound {
                    record: RecordKind::Speaker,
                    key: pending.speaker.to_string(),
                })?;

            talks.push(Talk {
                id: TalkId::new(),
                program_id: program.id,
                name: pending.name,
                scheduled_at: pending.scheduled_at,
                description: pending.description,
                speaker: speaker.clone(),
            });
        }

        Ok(MemoryContent {
            programs: self.programs,
            speakers: self.speakers,
            talks,
            questions: Mutex::new(Vec::new()),
        })
    }
}

/// Content provider backed by in-process vectors.
#[derive(Debug)]
pub struct MemoryContent {
    programs: Vec<Program>,
    speakers: Vec<Speaker>,
    talks: Vec<Talk>,
    questions: Mutex<Vec<Question>>,
}

impl MemoryContent {
    /// Starts building a provider.
    #[must_use]
    pub fn builder() -> MemoryContentBuilder {
        MemoryContentBuilder::new()
    }

    /// Returns every question submitted so far, oldest first.
    pub async fn questions(&self) -> Vec<Question> {
        self.questions.lock().await.clone()
    }

    fn program_id(&self, name: &str) -> Option<ProgramId> {
        self.programs.iter().find(|p| p.name == name).map(|p| p.id)
    }

    fn talks_in(&self, program: &str) -> impl Iterator<Item = &Talk> {
        let program_id = self.program_id(program);
        self.talks
            .iter()
            .filter(move |t| Some(t.program_id) == program_id)
    }
}

#[async_trait]
impl ContentProvider for MemoryContent {
    async fn list_programs(&self) -> Result<Vec<Program>, Report<ContentError>> {
        let mut programs = self.programs.clone();
        programs.sort_by(|a, b| {
            a.event_date
                .cmp(&b.event_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(programs)
    }

    async fn find_program(&self, name: &str) -> Result<Option<Program>, Report<ContentError>> {
        Ok(self.programs.iter().find(|p| p.name == name).cloned())
    }

    async fn list_talks(&self, program: &str) -> Result<Vec<Talk>, Report<ContentError>> {
        Ok(self.talks_in(program).cloned().collect())
    }

    async fn find_talk(
        &self,
        program: &str,
        name: &str,
    ) -> Result<Option<Talk>, Report<ContentError>> {
        Ok(self.talks_in(program).find(|t| t.name == name).cloned())
    }

    async fn find_talk_by_name(&self, name: &str) -> Result<Option<Talk>, Report<ContentError>> {
        Ok(self.talks.iter().find(|t| t.name == name).cloned())
    }

    async fn list_talk_times(&self, program: &str) -> Result<Vec<NaiveTime>, Report<ContentError>> {
        let mut times: Vec<NaiveTime> = self
            .talks_in(program)
            .map(|t| minute_slot(t.scheduled_at))
            .collect();
        times.sort();
        times.dedup();
        Ok(times)
    }

    async fn find_talk_at(
        &self,
        program: &str,
        time: NaiveTime,
    ) -> Result<Option<Talk>, Report<ContentError>> {
        Ok(self
            .talks_in(program)
            .find(|t| minute_slot(t.scheduled_at) == minute_slot(time))
            .cloned())
    }

    async fn find_speaker(
        &self,
        external_id: ExternalUserId,
    ) -> Result<Option<Speaker>, Report<ContentError>> {
        Ok(self
            .speakers
            .iter()
            .find(|s| s.external_id == external_id)
            .cloned())
    }

    async fn create_question(
        &self,
        question: NewQuestion,
    ) -> Result<Question, Report<ContentError>> {
        let speaker = self
            .speakers
            .iter()
            .find(|s| s.external_id == question.speaker)
            .ok_or_else(|| ContentError::RecordNotFound {
                record: RecordKind::Speaker,
                key: question.speaker.to_string(),
            })?;

        let question = question.into_question(speaker.id);
        self.questions.lock().await.push(question.clone());
        tracing::debug!(question_id = %question.id, speaker_id = %speaker.id, "stored question");
        Ok(question)
    }
}
