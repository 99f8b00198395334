//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the controller with mock implementations.

use crate::backend::{BackendError, SearchJob};
use crate::keyboards::Keyboard;
use crate::state_machine::state::{Filters, Listing, Verdict};
use crate::state_machine::UserId;
use async_trait::async_trait;
use std::sync::Arc;

/// The remote search service
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Start a search job for the user's filters
    async fn submit_search(
        &self,
        user_id: UserId,
        filters: &Filters,
        limit: u32,
    ) -> Result<SearchJob, BackendError>;

    /// Fetch the next page of listings for the user
    async fn fetch_feed(&self, user_id: UserId, limit: u32) -> Result<Vec<Listing>, BackendError>;

    /// Record a like or skip
    async fn report_state(
        &self,
        user_id: UserId,
        listing_id: &str,
        verdict: Verdict,
    ) -> Result<(), BackendError>;
}

/// Outbound side of the chat transport
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a new message, optionally with an inline keyboard
    async fn send(&self, chat_id: i64, text: &str, keyboard: Option<&Keyboard>)
        -> Result<(), String>;

    /// Replace the inline keyboard of an existing message
    async fn edit_keyboard(
        &self,
        chat_id: i64,
        message_id: i32,
        keyboard: &Keyboard,
    ) -> Result<(), String>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SearchBackend + ?Sized> SearchBackend for Arc<T> {
    async fn submit_search(
        &self,
        user_id: UserId,
        filters: &Filters,
        limit: u32,
    ) -> Result<SearchJob, BackendError> {
        (**self).submit_search(user_id, filters, limit).await
    }

    async fn fetch_feed(&self, user_id: UserId, limit: u32) -> Result<Vec<Listing>, BackendError> {
        (**self).fetch_feed(user_id, limit).await
    }

    async fn report_state(
        &self,
        user_id: UserId,
        listing_id: &str,
        verdict: Verdict,
    ) -> Result<(), BackendError> {
        (**self).report_state(user_id, listing_id, verdict).await
    }
}

#[async_trait]
impl<T: Messenger + ?Sized> Messenger for Arc<T> {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), String> {
        (**self).send(chat_id, text, keyboard).await
    }

    async fn edit_keyboard(
        &self,
        chat_id: i64,
        message_id: i32,
        keyboard: &Keyboard,
    ) -> Result<(), String> {
        (**self).edit_keyboard(chat_id, message_id, keyboard).await
    }
}
