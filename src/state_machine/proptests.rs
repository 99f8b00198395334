//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across generated inputs.

use super::state::*;
use super::transition::*;
use super::*;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

// ============================================================================
// Test Helpers
// ============================================================================

fn context(flow: Flow) -> FlowContext {
    FlowContext::new(DEFAULT_CITY, DEFAULT_FEED_LIMIT, flow)
}

fn listing(id: usize) -> Listing {
    Listing {
        id: format!("l{id}"),
        title: None,
        location: None,
        price_value: None,
        url: format!("https://example.com/{id}"),
    }
}

fn session_at(step: Step) -> Session {
    Session {
        step,
        ..Session::default()
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_district() -> impl Strategy<Value = &'static str> {
    prop::sample::select(DISTRICTS.to_vec())
}

fn arb_parking() -> impl Strategy<Value = Parking> {
    prop_oneof![Just(Parking::Garage), Just(Parking::Guarded)]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Idle),
        Just(Step::Districts),
        Just(Step::Price),
        Just(Step::Rooms),
        Just(Step::Pets),
        Just(Step::Parking),
        Just(Step::Elevator),
        Just(Step::Confirm),
        Just(Step::Searching),
        Just(Step::Showing),
    ]
}

fn arb_flow() -> impl Strategy<Value = Flow> {
    prop::collection::vec(prop::sample::select(OptionalStep::ALL.to_vec()), 0..5)
        .prop_map(Flow::with_steps)
}

/// Button events together with the only step that accepts them
fn arb_button() -> impl Strategy<Value = (Event, Step)> {
    prop_oneof![
        arb_district().prop_map(|d| (
            Event::ToggleDistrict {
                district: d.to_string()
            },
            Step::Districts
        )),
        Just((Event::SkipDistricts, Step::Districts)),
        Just((Event::DoneDistricts, Step::Districts)),
        prop::sample::select(RoomChoice::ALL.to_vec())
            .prop_map(|choice| (Event::SelectRooms { choice }, Step::Rooms)),
        Just((Event::SelectPets { pets: None }, Step::Pets)),
        arb_parking().prop_map(|parking| (Event::ToggleParking { parking }, Step::Parking)),
        Just((Event::DoneParking, Step::Parking)),
        any::<bool>().prop_map(|required| (Event::SelectElevator { required }, Step::Elevator)),
        Just((Event::Go, Step::Confirm)),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// A district ends up selected exactly when it was toggled an odd number
    /// of times, and never twice.
    #[test]
    fn prop_district_toggles_follow_parity(
        toggles in prop::collection::vec(arb_district(), 0..30)
    ) {
        let ctx = context(Flow::full());
        let mut session = session_at(Step::Districts);
        for district in &toggles {
            session = transition(
                &session,
                &ctx,
                Event::ToggleDistrict { district: (*district).to_string() },
            )
            .unwrap()
            .session;
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for district in &toggles {
            *counts.entry(*district).or_default() += 1;
        }
        for district in DISTRICTS {
            let selected = session.filters.districts.iter().filter(|d| *d == district).count();
            let expected = usize::from(counts.get(district).copied().unwrap_or(0) % 2 == 1);
            prop_assert_eq!(selected, expected, "district {}", district);
        }
        prop_assert_eq!(session.step, Step::Districts);
    }

    /// Pressing the same parking option twice restores the previous selection.
    /// Order may change, since a re-added option goes to the end.
    #[test]
    fn prop_parking_double_toggle_restores_selection(
        before in prop::collection::vec(arb_parking(), 0..4),
        option in arb_parking(),
    ) {
        let ctx = context(Flow::full());
        let mut session = session_at(Step::Parking);
        for parking in before {
            session.filters.toggle_parking(parking);
        }

        let once = transition(&session, &ctx, Event::ToggleParking { parking: option }).unwrap();
        prop_assert_ne!(
            once.session.filters.parking.contains(&option),
            session.filters.parking.contains(&option)
        );
        let twice = transition(&once.session, &ctx, Event::ToggleParking { parking: option }).unwrap();

        let selected: HashSet<Parking> = twice.session.filters.parking.iter().copied().collect();
        let expected: HashSet<Parking> = session.filters.parking.iter().copied().collect();
        prop_assert_eq!(selected, expected);
        prop_assert_eq!(twice.session.filters.parking.len(), session.filters.parking.len());

        let mut rest = twice.session.clone();
        rest.filters.parking.clone_from(&session.filters.parking);
        prop_assert_eq!(rest, session);
    }

    /// Any positive integer survives arbitrary inner whitespace.
    #[test]
    fn prop_price_ignores_whitespace(
        value in 1u32..10_000_000,
        gaps in prop::collection::vec(prop_oneof![Just(""), Just(" "), Just("\t")], 12),
    ) {
        let digits = value.to_string();
        let mut text = String::from(gaps[0]);
        for (i, ch) in digits.chars().enumerate() {
            text.push(ch);
            text.push_str(gaps[(i + 1) % gaps.len()]);
        }
        prop_assert_eq!(parse_price(&text), Ok(value));
    }

    /// Triage shows every listing exactly once, in feed order, and ends idle.
    #[test]
    fn prop_triage_is_fifo_and_exhausting(
        verdicts in prop::collection::vec(
            prop_oneof![Just(Verdict::Liked), Just(Verdict::Skipped)],
            1..12,
        )
    ) {
        let ctx = context(Flow::full());
        let feed: Vec<Listing> = (0..verdicts.len()).map(listing).collect();
        let result = transition(
            &session_at(Step::Searching),
            &ctx,
            Event::FeedLoaded { listings: feed.clone() },
        )
        .unwrap();

        let mut session = result.session;
        let mut shown = vec![session.current.clone().unwrap()];
        let mut reported = Vec::new();

        for verdict in verdicts {
            prop_assert_eq!(session.step, Step::Showing);
            let card = card_token(session.current.as_deref().unwrap());
            let result = transition(
                &session,
                &ctx,
                Event::React { card, verdict },
            )
            .unwrap();
            for effect in &result.effects {
                if let Effect::ReportState { listing_id, .. } = effect {
                    reported.push(listing_id.clone());
                }
            }
            session = result.session;
            if let Some(current) = &session.current {
                shown.push(current.clone());
            }
        }

        let expected: Vec<String> = feed.iter().map(|l| l.id.clone()).collect();
        prop_assert_eq!(&shown, &expected);
        prop_assert_eq!(&reported, &expected);
        prop_assert_eq!(session.step, Step::Idle);
        prop_assert!(session.queue.is_empty());
    }

    /// Buttons pressed outside their step never change the session.
    #[test]
    fn prop_out_of_step_buttons_are_stale(
        step in arb_step(),
        (event, accepted_in) in arb_button(),
    ) {
        prop_assume!(step != accepted_in);
        let session = session_at(step);
        let result = transition(&session, &context(Flow::full()), event);
        let is_stale = matches!(result, Err(TransitionError::Stale { .. }));
        prop_assert!(is_stale);
    }

    /// Start lands on the first enabled step with a clean session.
    #[test]
    fn prop_start_always_resets(step in arb_step(), flow in arb_flow(), price in 1u32..10_000) {
        let mut session = session_at(step);
        session.filters.price_max = Some(price);
        session.queue.push_back(listing(1));
        session.current = Some("l0".to_string());

        let ctx = context(flow.clone());
        let result = transition(&session, &ctx, Event::Start).unwrap();

        prop_assert_eq!(result.session.step, flow.first_step());
        prop_assert_eq!(result.session.filters, Filters::default());
        prop_assert!(result.session.queue.is_empty());
        prop_assert_eq!(result.session.current, None);
    }

    /// Walking every enabled step ends in a search carrying the collected price.
    #[test]
    fn prop_any_flow_reaches_search(flow in arb_flow(), price in 1u32..100_000) {
        let ctx = context(flow);
        let mut session = transition(&Session::default(), &ctx, Event::Start).unwrap().session;
        let mut submitted = None;

        for _ in 0..10 {
            let event = match session.step {
                Step::Districts => Event::DoneDistricts,
                Step::Price => Event::Text { text: price.to_string() },
                Step::Rooms => Event::SelectRooms { choice: RoomChoice::Any },
                Step::Pets => Event::SelectPets { pets: None },
                Step::Parking => Event::DoneParking,
                Step::Elevator => Event::SelectElevator { required: false },
                Step::Confirm => Event::Go,
                Step::Idle | Step::Searching | Step::Showing => break,
            };
            let result = transition(&session, &ctx, event).unwrap();
            for effect in result.effects {
                if let Effect::SubmitSearch { filters, .. } = effect {
                    submitted = Some(filters);
                }
            }
            session = result.session;
        }

        prop_assert_eq!(session.step, Step::Searching);
        let filters = submitted.unwrap();
        prop_assert_eq!(filters.price_max, Some(price));
        prop_assert!(filters.rooms.is_empty());
    }
}
