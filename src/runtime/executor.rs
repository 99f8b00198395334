//! Conversation controller
//!
//! Runs events through the pure transition function and executes the
//! resulting effects against the backend and the chat transport.

use super::traits::{Messenger, SearchBackend};
use super::{Incoming, Outcome, SessionStore};
use crate::state_machine::{transition, Effect, Event, FlowContext, TransitionError};
use std::collections::VecDeque;

/// Generic controller that can work with any backend and messenger implementation
pub struct Controller<B, M>
where
    B: SearchBackend + 'static,
    M: Messenger + 'static,
{
    context: FlowContext,
    sessions: SessionStore,
    backend: B,
    messenger: M,
}

impl<B, M> Controller<B, M>
where
    B: SearchBackend + 'static,
    M: Messenger + 'static,
{
    pub fn new(context: FlowContext, backend: B, messenger: M) -> Self {
        let sessions = SessionStore::new(context.default_city.clone());
        Self {
            context,
            sessions,
            backend,
            messenger,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one inbound event to completion, including backend calls.
    ///
    /// The user's session stays locked for the whole call, so events from the
    /// same user are processed one after another.
    pub async fn handle(&self, incoming: Incoming) -> Outcome {
        let slot = self.sessions.slot(incoming.user_id).await;
        let mut session = slot.lock().await;
        let mut outcome = Outcome::default();

        tracing::debug!(
            user_id = %incoming.user_id,
            step = %session.step,
            event = incoming.event.name(),
            "Handling event"
        );

        // Backend effects feed their results back in as new events
        let mut events_to_process = VecDeque::from([incoming.event.clone()]);

        while let Some(event) = events_to_process.pop_front() {
            let result = match transition(&session, &self.context, event) {
                Ok(r) => r,
                Err(TransitionError::Stale { step, event }) => {
                    tracing::debug!(
                        user_id = %incoming.user_id,
                        %step,
                        event,
                        "Ignoring stale event"
                    );
                    continue;
                }
            };

            let old_step = session.step;
            *session = result.session;
            if old_step != session.step {
                tracing::info!(
                    user_id = %incoming.user_id,
                    from = %old_step,
                    to = %session.step,
                    "Step changed"
                );
            }

            for effect in result.effects {
                if let Some(generated) = self.execute_effect(&incoming, effect, &mut outcome).await
                {
                    events_to_process.push_back(generated);
                }
            }
        }

        outcome.step = session.step;
        outcome
    }

    async fn execute_effect(
        &self,
        incoming: &Incoming,
        effect: Effect,
        outcome: &mut Outcome,
    ) -> Option<Event> {
        let user_id = incoming.user_id;
        match effect {
            Effect::Reply { text, keyboard } => {
                if let Err(e) = self
                    .messenger
                    .send(incoming.chat_id, &text, keyboard.as_ref())
                    .await
                {
                    tracing::error!(%user_id, error = %e, "Failed to send message");
                }
                None
            }

            Effect::EditKeyboard { keyboard } => {
                let Some(message_id) = incoming.message_id else {
                    tracing::debug!(%user_id, "No message to edit, keyboard update dropped");
                    return None;
                };
                if let Err(e) = self
                    .messenger
                    .edit_keyboard(incoming.chat_id, message_id, &keyboard)
                    .await
                {
                    tracing::warn!(%user_id, message_id, error = %e, "Failed to edit keyboard");
                }
                None
            }

            Effect::Toast { text } => {
                outcome.toast = Some(text);
                None
            }

            Effect::SubmitSearch { filters, limit } => {
                match self.backend.submit_search(user_id, &filters, limit).await {
                    Ok(job) => {
                        tracing::info!(%user_id, job_id = %job.job_id, "Search submitted");
                        Some(Event::SearchAccepted { job_id: job.job_id })
                    }
                    Err(e) => {
                        tracing::error!(%user_id, error = %e, kind = %e.kind, "Search failed");
                        Some(Event::BackendFailed)
                    }
                }
            }

            Effect::FetchFeed { limit } => match self.backend.fetch_feed(user_id, limit).await {
                Ok(listings) => {
                    tracing::info!(%user_id, count = listings.len(), "Feed loaded");
                    Some(Event::FeedLoaded { listings })
                }
                Err(e) => {
                    tracing::error!(%user_id, error = %e, kind = %e.kind, "Feed failed");
                    Some(Event::BackendFailed)
                }
            },

            // Best effort: triage must keep going whatever happens here
            Effect::ReportState {
                listing_id,
                verdict,
            } => {
                if let Err(e) = self
                    .backend
                    .report_state(user_id, &listing_id, verdict)
                    .await
                {
                    tracing::warn!(
                        %user_id,
                        %listing_id,
                        verdict = verdict.as_str(),
                        error = %e,
                        "Failed to report listing state"
                    );
                }
                None
            }
        }
    }
}
