//! Pure state transition function
//!
//! Given a session, the shared flow settings and an event, produce the next
//! session and the effects the runtime must execute. No I/O happens here.

use super::state::{card_token, parse_price, FlowContext, Session, Step};
use super::{Effect, Event};
use crate::keyboards;
use crate::messages;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The event belongs to a step the session is no longer in, typically a
    /// button on an older message.
    #[error("{event} is not expected in step {step}")]
    Stale { step: Step, event: &'static str },
}

/// Pure transition function
pub fn transition(
    session: &Session,
    context: &FlowContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (session.step, event) {
        // ============================================================
        // Unconditional commands
        // ============================================================

        (_, Event::Start) => {
            let fresh = Session::fresh(&context.default_city);
            let first = context.flow.first_step();
            Ok(enter(fresh, first, context, vec![Effect::reply(messages::GREETING)]))
        }

        (_, Event::Restart) => Ok(TransitionResult::new(Session::fresh(&context.default_city))
            .with_effect(Effect::reply(messages::RESTARTED))),

        // ============================================================
        // Districts
        // ============================================================

        (Step::Districts, Event::ToggleDistrict { district }) => {
            let mut next = session.clone();
            next.filters.toggle_district(&district);
            let keyboard = keyboards::districts(&next.filters.districts);
            Ok(TransitionResult::new(next).with_effect(Effect::EditKeyboard { keyboard }))
        }

        (Step::Districts, Event::SkipDistricts) => {
            let mut next = session.clone();
            next.filters.districts.clear();
            Ok(advance(next, context))
        }

        (Step::Districts, Event::DoneDistricts) => Ok(advance(session.clone(), context)),

        // ============================================================
        // Price (free text)
        // ============================================================

        (Step::Price, Event::Text { text }) => match parse_price(&text) {
            Ok(price) => {
                let mut next = session.clone();
                next.filters.price_max = Some(price);
                Ok(advance(next, context))
            }
            Err(_) => Ok(TransitionResult::new(session.clone())
                .with_effect(Effect::reply(messages::PRICE_INVALID))),
        },

        // Text anywhere else only earns a hint
        (_, Event::Text { .. }) => Ok(TransitionResult::new(session.clone())
            .with_effect(Effect::reply(messages::NEW_SEARCH_HINT))),

        // ============================================================
        // Single-choice steps
        // ============================================================

        (Step::Rooms, Event::SelectRooms { choice }) => {
            let mut next = session.clone();
            next.filters.rooms = choice.room_kinds();
            Ok(advance(next, context))
        }

        (Step::Pets, Event::SelectPets { pets }) => {
            let mut next = session.clone();
            next.filters.pets = pets;
            Ok(advance(next, context))
        }

        (Step::Elevator, Event::SelectElevator { required }) => {
            let mut next = session.clone();
            next.filters.elevator = required.then_some(true);
            Ok(advance(next, context))
        }

        // ============================================================
        // Parking
        // ============================================================

        (Step::Parking, Event::ToggleParking { parking }) => {
            let mut next = session.clone();
            next.filters.toggle_parking(parking);
            let keyboard = keyboards::parking(&next.filters.parking);
            Ok(TransitionResult::new(next).with_effect(Effect::EditKeyboard { keyboard }))
        }

        (Step::Parking, Event::SkipParking) => {
            let mut next = session.clone();
            next.filters.parking.clear();
            Ok(advance(next, context))
        }

        (Step::Parking, Event::DoneParking) => Ok(advance(session.clone(), context)),

        // ============================================================
        // Search pipeline
        // ============================================================

        (Step::Confirm, Event::Go) => Ok(enter(session.clone(), Step::Searching, context, vec![])),

        (Step::Searching, Event::SearchAccepted { job_id }) => {
            Ok(TransitionResult::new(session.clone())
                .with_effect(Effect::reply(messages::job_accepted(&job_id)))
                .with_effect(Effect::FetchFeed {
                    limit: context.feed_limit,
                }))
        }

        // The feed replaces whatever was queued before
        (Step::Searching, Event::FeedLoaded { listings }) => {
            let mut next = session.clone();
            next.queue = listings.into();
            if next.queue.is_empty() {
                next.step = Step::Idle;
                next.current = None;
                Ok(TransitionResult::new(next).with_effect(Effect::reply(messages::FEED_EMPTY)))
            } else {
                Ok(deliver_next(next, vec![]))
            }
        }

        (Step::Searching, Event::BackendFailed) => {
            let mut next = session.clone();
            next.step = Step::Idle;
            next.queue.clear();
            next.current = None;
            Ok(TransitionResult::new(next)
                .with_effect(Effect::reply(messages::BACKEND_UNAVAILABLE)))
        }

        // ============================================================
        // Triage
        // ============================================================

        // Only the card on screen accepts a reaction
        (Step::Showing, Event::React { card, verdict }) => match &session.current {
            Some(listing_id) if card_token(listing_id) == card => {
                let effects = vec![
                    Effect::ReportState {
                        listing_id: listing_id.clone(),
                        verdict,
                    },
                    Effect::toast(messages::reaction_toast(verdict)),
                ];
                Ok(deliver_next(session.clone(), effects))
            }
            _ => Err(TransitionError::Stale {
                step: Step::Showing,
                event: "react",
            }),
        },

        // ============================================================
        // Everything else is stale
        // ============================================================

        (step, event) => Err(TransitionError::Stale {
            step,
            event: event.name(),
        }),
    }
}

/// Move to the next enabled step after the current one
fn advance(session: Session, context: &FlowContext) -> TransitionResult {
    let next = context.flow.next_after(session.step);
    enter(session, next, context, vec![])
}

/// Enter `step`, emitting `lead` first and then the step's prompt
fn enter(
    mut session: Session,
    step: Step,
    context: &FlowContext,
    lead: Vec<Effect>,
) -> TransitionResult {
    session.step = step;
    let prompt = match step {
        Step::Districts => vec![Effect::reply_with(
            messages::DISTRICTS_PROMPT,
            keyboards::districts(&session.filters.districts),
        )],
        Step::Price => vec![Effect::reply(messages::PRICE_PROMPT)],
        Step::Rooms => vec![Effect::reply_with(messages::ROOMS_PROMPT, keyboards::rooms())],
        Step::Pets => vec![Effect::reply_with(
            messages::PETS_PROMPT,
            keyboards::pets(session.filters.pets),
        )],
        Step::Parking => vec![Effect::reply_with(
            messages::PARKING_PROMPT,
            keyboards::parking(&session.filters.parking),
        )],
        Step::Elevator => vec![Effect::reply_with(
            messages::ELEVATOR_PROMPT,
            keyboards::elevator(session.filters.elevator),
        )],
        Step::Confirm => vec![Effect::reply_with(
            messages::summary(&session.filters),
            keyboards::confirm(),
        )],
        Step::Searching => vec![
            Effect::reply(messages::SEARCH_STARTED),
            Effect::SubmitSearch {
                filters: session.filters.clone(),
                limit: context.feed_limit,
            },
        ],
        Step::Idle | Step::Showing => vec![],
    };
    TransitionResult::new(session)
        .with_effects(lead)
        .with_effects(prompt)
}

/// Show the head of the queue, or finish triage when it is empty
fn deliver_next(mut session: Session, lead: Vec<Effect>) -> TransitionResult {
    let delivery = match session.queue.pop_front() {
        Some(listing) => {
            session.step = Step::Showing;
            session.current = Some(listing.id.clone());
            Effect::reply_with(
                messages::listing_card(&listing),
                keyboards::listing(&listing.id),
            )
        }
        None => {
            session.step = Step::Idle;
            session.current = None;
            Effect::reply(messages::NOTHING_LEFT)
        }
    };
    TransitionResult::new(session)
        .with_effects(lead)
        .with_effect(delivery)
}
