//! Search backend abstraction
//!
//! HTTP client for the search/feed/state service plus a logging wrapper.

mod client;
mod error;
mod types;

pub use client::HttpBackend;
pub use error::{BackendError, BackendErrorKind};
pub use types::*;

use crate::runtime::SearchBackend;
use crate::state_machine::state::{Filters, Listing, Verdict};
use crate::state_machine::UserId;
use async_trait::async_trait;
use std::time::Instant;

/// Logging wrapper for search backends
pub struct LoggingBackend<B> {
    inner: B,
}

impl<B: SearchBackend> LoggingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<B: SearchBackend> SearchBackend for LoggingBackend<B> {
    async fn submit_search(
        &self,
        user_id: UserId,
        filters: &Filters,
        limit: u32,
    ) -> Result<SearchJob, BackendError> {
        let start = Instant::now();
        let result = self.inner.submit_search(user_id, filters, limit).await;
        log_call("search", user_id, start, &result);
        result
    }

    async fn fetch_feed(&self, user_id: UserId, limit: u32) -> Result<Vec<Listing>, BackendError> {
        let start = Instant::now();
        let result = self.inner.fetch_feed(user_id, limit).await;
        log_call("feed", user_id, start, &result);
        result
    }

    async fn report_state(
        &self,
        user_id: UserId,
        listing_id: &str,
        verdict: Verdict,
    ) -> Result<(), BackendError> {
        let start = Instant::now();
        let result = self.inner.report_state(user_id, listing_id, verdict).await;
        log_call("state", user_id, start, &result);
        result
    }
}

fn log_call<T>(
    endpoint: &'static str,
    user_id: UserId,
    start: Instant,
    result: &Result<T, BackendError>,
) {
    let duration = start.elapsed();
    match result {
        Ok(_) => {
            tracing::debug!(
                endpoint,
                %user_id,
                duration_ms = %duration.as_millis(),
                "Backend request completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                endpoint,
                %user_id,
                duration_ms = %duration.as_millis(),
                kind = %e.kind,
                error = %e.message,
                "Backend request failed"
            );
        }
    }
}
