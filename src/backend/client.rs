//! HTTP implementation of the search backend

use super::error::BackendError;
use super::types::{FeedQuery, SearchFilters, SearchJob, SearchRequest, StateReport};
use crate::runtime::SearchBackend;
use crate::state_machine::state::{Filters, Listing, Verdict};
use crate::state_machine::UserId;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub struct HttpBackend {
    client: Client,
    base_url: String,
    request_timeout: Duration,
    state_timeout: Duration,
}

impl HttpBackend {
    /// `request_timeout` bounds search and feed calls, `state_timeout` bounds
    /// like/skip reports.
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        state_timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .build()
            .map_err(|e| BackendError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout,
            state_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Read the body of a finished request, failing on non-2xx
async fn read_body(response: reqwest::Response) -> Result<String, BackendError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::from_reqwest(&e))?;

    if !status.is_success() {
        return Err(BackendError::status(status.as_u16(), &body));
    }
    Ok(body)
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let body = read_body(response).await?;
    serde_json::from_str(&body)
        .map_err(|e| BackendError::decode(format!("Failed to parse response: {e}")))
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn submit_search(
        &self,
        user_id: UserId,
        filters: &Filters,
        limit: u32,
    ) -> Result<SearchJob, BackendError> {
        let request = SearchRequest {
            user_id,
            filters: SearchFilters::from(filters),
            limit,
        };

        let response = self
            .client
            .post(self.url("/search"))
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        read_json(response).await
    }

    async fn fetch_feed(&self, user_id: UserId, limit: u32) -> Result<Vec<Listing>, BackendError> {
        let response = self
            .client
            .get(self.url("/feed"))
            .timeout(self.request_timeout)
            .query(&FeedQuery { user_id, limit })
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        // Anything but an array reads as an empty feed
        let body: Value = read_json(response).await?;
        if !body.is_array() {
            tracing::warn!(%user_id, "Feed response is not an array, treating as empty");
            return Ok(Vec::new());
        }
        serde_json::from_value(body)
            .map_err(|e| BackendError::decode(format!("Failed to parse listings: {e}")))
    }

    async fn report_state(
        &self,
        user_id: UserId,
        listing_id: &str,
        verdict: Verdict,
    ) -> Result<(), BackendError> {
        let report = StateReport {
            user_id,
            listing_id,
            state: verdict,
        };

        let response = self
            .client
            .post(self.url("/state"))
            .timeout(self.state_timeout)
            .json(&report)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        read_body(response).await.map(|_| ())
    }
}
