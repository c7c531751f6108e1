//! Content provider for the meetup-concierge bot.
//!
//! This crate provides:
//!
//! - **Records**: Programs, talks, speakers and questions
//! - **Content Provider**: The read/write façade the conversation engine queries
//! - **Memory Content**: An in-memory provider seeded programmatically

pub mod error;
pub mod memory;
pub mod provider;
pub mod record;

pub use error::{ContentError, RecordKind};
pub use memory::{MemoryContent, MemoryContentBuilder};
pub use provider::ContentProvider;
pub use record::{
    NewQuestion, Program, Question, Speaker, Talk, format_time, minute_slot, parse_time,
};
