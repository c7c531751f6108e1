//! PostgreSQL-backed content provider.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use meetup_concierge_content::{
    ContentError, ContentProvider, NewQuestion, Program, Question, RecordKind, Speaker, Talk,
    minute_slot,
};
use meetup_concierge_core::{ExternalUserId, ProgramId, SpeakerId, TalkId};
use rootcause::prelude::Report;
use sqlx::{FromRow, PgPool};
use std::fmt::Display;
use std::str::FromStr;
use tracing::instrument;

// Talk ids are ULID text, so `t.id` under the "C" collation is creation
// order, which is the order talks are listed in. Times are compared by
// minute slot because attendees pick them as `HH:MM`.

/// Prefixes a filter with the joined talk/speaker projection.
macro_rules! talk_query {
    ($tail:literal) => {
        concat!(
            r#"
            SELECT t.id, t.program_id, t.name, t.scheduled_at, t.description,
                   s.id AS speaker_id, s.telegram_id AS speaker_telegram_id,
                   s.full_name AS speaker_full_name
            FROM talks t
            JOIN programs p ON p.id = t.program_id
            JOIN speakers s ON s.id = t.speaker_id
            "#,
            $tail
        )
    };
}

const LIST_TALKS: &str = talk_query!(r#"WHERE p.name = $1 ORDER BY t.id COLLATE "C" ASC"#);

const FIND_TALK: &str =
    talk_query!(r#"WHERE p.name = $1 AND t.name = $2 ORDER BY t.id COLLATE "C" ASC LIMIT 1"#);

const FIND_TALK_BY_NAME: &str =
    talk_query!(r#"WHERE t.name = $1 ORDER BY t.id COLLATE "C" ASC LIMIT 1"#);

const FIND_TALK_AT: &str = talk_query!(
    r#"WHERE p.name = $1 AND date_trunc('minute', t.scheduled_at::interval)::time = $2
    ORDER BY t.id COLLATE "C" ASC LIMIT 1"#
);

const LIST_TALK_TIMES: &str = r#"
    SELECT DISTINCT date_trunc('minute', t.scheduled_at::interval)::time AS slot
    FROM talks t
    JOIN programs p ON p.id = t.program_id
    WHERE p.name = $1
    ORDER BY slot ASC
"#;

fn parse_id<T>(value: &str, what: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: Display,
{
    T::from_str(value).map_err(|e| {
        sqlx::Error::Decode(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("invalid {what} id '{value}': {e}"),
        )))
    })
}

fn query_failed(e: sqlx::Error) -> Report<ContentError> {
    ContentError::QueryFailed {
        details: e.to_string(),
    }
    .into()
}

/// Row type for program queries.
#[derive(FromRow)]
struct ProgramRow {
    id: String,
    name: String,
    event_date: NaiveDate,
}

impl ProgramRow {
    fn try_into_program(self) -> Result<Program, sqlx::Error> {
        Ok(Program {
            id: parse_id::<ProgramId>(&self.id, "program")?,
            name: self.name,
            event_date: self.event_date,
        })
    }
}

/// Row type for speaker queries.
#[derive(FromRow)]
struct SpeakerRow {
    id: String,
    telegram_id: i64,
    full_name: String,
}

impl SpeakerRow {
    fn try_into_speaker(self) -> Result<Speaker, sqlx::Error> {
        Ok(Speaker {
            id: parse_id::<SpeakerId>(&self.id, "speaker")?,
            external_id: ExternalUserId::new(self.telegram_id),
            full_name: self.full_name,
        })
    }
}

/// Row type for talk queries, joined with the talk's speaker.
#[derive(FromRow)]
struct TalkRow {
    id: String,
    program_id: String,
    name: String,
    scheduled_at: NaiveTime,
    description: String,
    speaker_id: String,
    speaker_telegram_id: i64,
    speaker_full_name: String,
}

impl TalkRow {
    fn try_into_talk(self) -> Result<Talk, sqlx::Error> {
        let speaker = SpeakerRow {
            id: self.speaker_id,
            telegram_id: self.speaker_telegram_id,
            full_name: self.speaker_full_name,
        }
        .try_into_speaker()?;

        Ok(Talk {
            id: parse_id::<TalkId>(&self.id, "talk")?,
            program_id: parse_id::<ProgramId>(&self.program_id, "program")?,
            name: self.name,
            scheduled_at: self.scheduled_at,
            description: self.description,
            speaker,
        })
    }
}

/// Content provider reading from PostgreSQL.
#[derive(Clone)]
pub struct PgContent {
    pool: PgPool,
}

impl PgContent {
    /// Creates a new provider.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_talk(row: Option<TalkRow>) -> Result<Option<Talk>, Report<ContentError>> {
    row.map(TalkRow::try_into_talk)
        .transpose()
        .map_err(query_failed)
}

#[async_trait]
impl ContentProvider for PgContent {
    #[instrument(skip(self))]
    async fn list_programs(&self) -> Result<Vec<Program>, Report<ContentError>> {
        let rows: Vec<ProgramRow> = sqlx::query_as(
            r#"
            SELECT id, name, event_date
            FROM programs
            ORDER BY event_date ASC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.into_iter()
            .map(ProgramRow::try_into_program)
            .collect::<Result<_, _>>()
            .map_err(query_failed)
    }

    #[instrument(skip(self))]
    async fn find_program(&self, name: &str) -> Result<Option<Program>, Report<ContentError>> {
        let row: Option<ProgramRow> = sqlx::query_as(
            r#"
            SELECT id, name, event_date
            FROM programs
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        row.map(ProgramRow::try_into_program)
            .transpose()
            .map_err(query_failed)
    }

    #[instrument(skip(self))]
    async fn list_talks(&self, program: &str) -> Result<Vec<Talk>, Report<ContentError>> {
        let rows: Vec<TalkRow> = sqlx::query_as(LIST_TALKS)
        .bind(program)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.into_iter()
            .map(TalkRow::try_into_talk)
            .collect::<Result<_, _>>()
            .map_err(query_failed)
    }

    #[instrument(skip(self))]
    async fn find_talk(
        &self,
        program: &str,
        name: &str,
    ) -> Result<Option<Talk>, Report<ContentError>> {
        let row: Option<TalkRow> = sqlx::query_as(FIND_TALK)
        .bind(program)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        into_talk(row)
    }

    #[instrument(skip(self))]
    async fn find_talk_by_name(&self, name: &str) -> Result<Option<Talk>, Report<ContentError>> {
        let row: Option<TalkRow> = sqlx::query_as(FIND_TALK_BY_NAME)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        into_talk(row)
    }

    #[instrument(skip(self))]
    async fn list_talk_times(&self, program: &str) -> Result<Vec<NaiveTime>, Report<ContentError>> {
        let rows: Vec<(NaiveTime,)> = sqlx::query_as(LIST_TALK_TIMES)
        .bind(program)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(rows.into_iter().map(|(time,)| time).collect())
    }

    #[instrument(skip(self))]
    async fn find_talk_at(
        &self,
        program: &str,
        time: NaiveTime,
    ) -> Result<Option<Talk>, Report<ContentError>> {
        let row: Option<TalkRow> = sqlx::query_as(FIND_TALK_AT)
        .bind(program)
        .bind(minute_slot(time))
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        into_talk(row)
    }

    #[instrument(skip(self))]
    async fn find_speaker(
        &self,
        external_id: ExternalUserId,
    ) -> Result<Option<Speaker>, Report<ContentError>> {
        let row: Option<SpeakerRow> = sqlx::query_as(
            r#"
            SELECT id, telegram_id, full_name
            FROM speakers
            WHERE telegram_id = $1
            "#,
        )
        .bind(external_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        row.map(SpeakerRow::try_into_speaker)
            .transpose()
            .map_err(query_failed)
    }

    #[instrument(skip(self, question), fields(asker = %question.asker, speaker = %question.speaker))]
    async fn create_question(
        &self,
        question: NewQuestion,
    ) -> Result<Question, Report<ContentError>> {
        let speaker = self
            .find_speaker(question.speaker)
            .await?
            .ok_or_else(|| ContentError::RecordNotFound {
                record: RecordKind::Speaker,
                key: question.speaker.to_string(),
            })?;

        let question = question.into_question(speaker.id);
        sqlx::query(
            r#"
            INSERT INTO questions (id, asker_telegram_id, body, speaker_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(question.id.to_string())
        .bind(question.asker.get())
        .bind(&question.body)
        .bind(question.speaker_id.to_string())
        .bind(question.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ContentError::WriteFailed {
            details: e.to_string(),
        })?;

        Ok(question)
    }
}
