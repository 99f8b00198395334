//! Events that can occur in a conversation

use super::state::{Listing, Parking, Pets, RoomChoice, Verdict};

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User commands
    Start,
    Restart,
    Text {
        text: String,
    },

    // Button presses
    ToggleDistrict {
        district: String,
    },
    SkipDistricts,
    DoneDistricts,
    SelectRooms {
        choice: RoomChoice,
    },
    /// `None` means "any"
    SelectPets {
        pets: Option<Pets>,
    },
    ToggleParking {
        parking: Parking,
    },
    SkipParking,
    DoneParking,
    SelectElevator {
        required: bool,
    },
    Go,
    /// Like or skip on the card identified by `card` (see `card_token`)
    React {
        card: String,
        verdict: Verdict,
    },

    // Backend outcomes
    SearchAccepted {
        job_id: String,
    },
    FeedLoaded {
        listings: Vec<Listing>,
    },
    /// Search or feed call failed; the runtime has already logged why
    BackendFailed,
}

impl Event {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Restart => "restart",
            Event::Text { .. } => "text",
            Event::ToggleDistrict { .. } => "toggle_district",
            Event::SkipDistricts => "skip_districts",
            Event::DoneDistricts => "done_districts",
            Event::SelectRooms { .. } => "select_rooms",
            Event::SelectPets { .. } => "select_pets",
            Event::ToggleParking { .. } => "toggle_parking",
            Event::SkipParking => "skip_parking",
            Event::DoneParking => "done_parking",
            Event::SelectElevator { .. } => "select_elevator",
            Event::Go => "go",
            Event::React { .. } => "react",
            Event::SearchAccepted { .. } => "search_accepted",
            Event::FeedLoaded { .. } => "feed_loaded",
            Event::BackendFailed => "backend_failed",
        }
    }

    /// Parse a chat command such as `/start` or `/start@SomeBot`
    pub fn from_command(text: &str) -> Option<Self> {
        let command = text.split_whitespace().next()?;
        let command = command.split('@').next().unwrap_or(command);
        match command {
            "/start" => Some(Event::Start),
            "/restart" => Some(Event::Restart),
            _ => None,
        }
    }

    /// Interpret an incoming text message
    pub fn from_text(text: &str) -> Self {
        Self::from_command(text).unwrap_or_else(|| Event::Text {
            text: text.to_string(),
        })
    }
}
