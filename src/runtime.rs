//! Runtime for executing conversations
//!
//! Owns the per-user sessions and drives the state machine for every inbound
//! event.

mod executor;
pub mod traits;


pub use executor::Controller;
pub use traits::*;

use crate::state_machine::{Event, Session, Step, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// An inbound event together with where it came from
#[derive(Debug, Clone)]
pub struct Incoming {
    pub user_id: UserId,
    pub chat_id: i64,
    /// Message carrying the pressed button, if any
    pub message_id: Option<i32>,
    pub event: Event,
}

impl Incoming {
    /// Text message or command typed by the user
    pub fn text(user_id: UserId, chat_id: i64, text: &str) -> Self {
        Self {
            user_id,
            chat_id,
            message_id: None,
            event: Event::from_text(text),
        }
    }

    /// Button pressed on `message_id`
    pub fn button(user_id: UserId, chat_id: i64, message_id: Option<i32>, event: Event) -> Self {
        Self {
            user_id,
            chat_id,
            message_id,
            event,
        }
    }
}

/// What the transport needs to know after an event was handled
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// Notice for the pressed button
    pub toast: Option<String>,
    /// Step the session ended in
    pub step: Step,
}

/// In-memory session map.
///
/// Sessions are created on first contact and live as long as the process.
/// Nothing is ever evicted.
pub struct SessionStore {
    default_city: String,
    sessions: RwLock<HashMap<UserId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new(default_city: impl Into<String>) -> Self {
        Self {
            default_city: default_city.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the session slot for a user
    pub async fn slot(&self, user_id: UserId) -> Arc<Mutex<Session>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(slot) = sessions.get(&user_id) {
                return slot.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        let slot = sessions.entry(user_id).or_insert_with(|| {
            tracing::debug!(%user_id, "Creating session");
            Arc::new(Mutex::new(Session::fresh(&self.default_city)))
        });
        slot.clone()
    }

    /// Copy of a user's session, if one exists
    #[allow(dead_code)] // Used by tests and diagnostics
    pub async fn snapshot(&self, user_id: UserId) -> Option<Session> {
        let slot = self.sessions.read().await.get(&user_id).cloned()?;
        let session = slot.lock().await;
        Some(session.clone())
    }

    /// Number of users seen since startup
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
