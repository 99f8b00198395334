//! Effects produced by state transitions

use super::state::{Filters, Verdict};
use crate::keyboards::Keyboard;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a new message to the user's chat
    Reply {
        text: String,
        keyboard: Option<Keyboard>,
    },

    /// Replace the keyboard of the message whose button was pressed
    EditKeyboard { keyboard: Keyboard },

    /// Short notice shown on the pressed button
    Toast { text: String },

    /// Submit a search job to the backend
    SubmitSearch { filters: Filters, limit: u32 },

    /// Load the listing feed
    FetchFeed { limit: u32 },

    /// Record the user's reaction to a listing (best effort)
    ReportState { listing_id: String, verdict: Verdict },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn reply_with(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Effect::Reply {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    pub fn toast(text: impl Into<String>) -> Self {
        Effect::Toast { text: text.into() }
    }

    /// Text of a reply effect, if this is one
    #[allow(dead_code)] // Test and log helper
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            Effect::Reply { text, .. } => Some(text),
            _ => None,
        }
    }
}
