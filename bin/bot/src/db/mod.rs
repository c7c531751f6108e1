//! Database access for the meetup-concierge bot.
//!
//! The bot reads programs, talks and speakers maintained elsewhere and
//! writes only questions. Expected tables:
//!
//! - `programs(id TEXT, name TEXT UNIQUE, event_date DATE)`
//! - `speakers(id TEXT, telegram_id BIGINT UNIQUE, full_name TEXT)`
//! - `talks(id TEXT, program_id TEXT, name TEXT, scheduled_at TIME, description TEXT, speaker_id TEXT)`
//! - `questions(id TEXT, asker_telegram_id BIGINT, body TEXT, speaker_id TEXT, created_at TIMESTAMPTZ)`

pub mod content;

pub use content::PgContent;
