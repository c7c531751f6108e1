//! Error types for the content crate.
//!
//! Errors are designed for layered context using rootcause. Lookups that
//! simply find nothing return `Ok(None)`; `RecordNotFound` is reserved for
//! operations whose input must reference an existing record.

use std::fmt;

/// The kind of record an operation referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Program,
    Talk,
    Speaker,
}

impl RecordKind {
    /// Returns the lowercase record name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::Talk => "talk",
            Self::Speaker => "speaker",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from content provider operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// A referenced record does not exist.
    RecordNotFound { record: RecordKind, key: String },
    /// Reading from the backing store failed.
    QueryFailed { details: String },
    /// Writing to the backing store failed.
    WriteFailed { details: String },
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordNotFound { record, key } => {
                write!(f, "{record} not found: {key}")
            }
            Self::QueryFailed { details } => {
                write!(f, "content query failed: {details}")
            }
            Self::WriteFailed { details } => {
                write!(f, "content write failed: {details}")
            }
        }
    }
}

impl std::error::Error for ContentError {}
