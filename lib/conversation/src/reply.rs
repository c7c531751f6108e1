//! Outbound replies.
//!
//! Replies are transport-agnostic: display text plus a markup directive.
//! The transport decides how a [`Keyboard`] is drawn.

use meetup_concierge_core::ExternalUserId;
use serde::{Deserialize, Serialize};

/// Rows of quick-reply labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    rows: Vec<Vec<String>>,
}

impl Keyboard {
    /// Lays labels out `per_row` to a row, in order.
    ///
    /// A `per_row` of zero is treated as one.
    #[must_use]
    pub fn chunked<I, S>(labels: I, per_row: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let rows = labels
            .chunks(per_row.max(1))
            .map(<[String]>::to_vec)
            .collect();
        Self { rows }
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Iterates over every label, row by row.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }
}

/// What to do with the user's keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyMarkup {
    /// Leave the keyboard as it is.
    None,
    /// Show a one-time keyboard.
    Keyboard(Keyboard),
    /// Hide the keyboard.
    RemoveKeyboard,
}

/// A reply to the user who sent the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Display text.
    pub text: String,
    /// Keyboard directive.
    pub markup: ReplyMarkup,
}

impl Reply {
    /// Creates a reply with a keyboard.
    #[must_use]
    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            markup: ReplyMarkup::Keyboard(keyboard),
        }
    }

    /// Creates a reply that hides the keyboard.
    #[must_use]
    pub fn remove_keyboard(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: ReplyMarkup::RemoveKeyboard,
        }
    }

    /// Creates a plain reply.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: ReplyMarkup::None,
        }
    }

    /// Puts a line above the reply text.
    #[must_use]
    pub fn prefixed(mut self, line: &str) -> Self {
        self.text = format!("{line}\n\n{}", self.text);
        self
    }

    /// Returns the keyboard, if the reply shows one.
    #[must_use]
    pub fn keyboard(&self) -> Option<&Keyboard> {
        match &self.markup {
            ReplyMarkup::Keyboard(keyboard) => Some(keyboard),
            _ => None,
        }
    }
}

/// A message for a speaker, sent on behalf of an attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerNotice {
    /// The speaker's messaging-platform id.
    pub recipient: ExternalUserId,
    /// Display text.
    pub text: String,
}

/// Everything produced by handling one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Reply to the sender.
    pub reply: Reply,
    /// Messages for speakers.
    pub notices: Vec<SpeakerNotice>,
}

impl From<Reply> for Outcome {
    fn from(reply: Reply) -> Self {
        Self {
            reply,
            notices: Vec::new(),
        }
    }
}
