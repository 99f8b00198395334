//! Session state types

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use thiserror::Error;

/// City sent with every search unless configured otherwise
pub const DEFAULT_CITY: &str = "Kraków";

/// Number of listings requested per search and per feed page
pub const DEFAULT_FEED_LIMIT: u32 = 10;

/// Districts offered on the districts keyboard
pub const DISTRICTS: [&str; 8] = [
    "Stare Miasto",
    "Grzegórzki",
    "Krowodrza",
    "Podgórze",
    "Nowa Huta",
    "Bronowice",
    "Bieżanów-Prokocim",
    "Łagiewniki-Borek-Falecki",
];

pub fn is_known_district(name: &str) -> bool {
    DISTRICTS.contains(&name)
}

// ============================================================================
// Identity
// ============================================================================

/// Messenger-level user identifier, also sent to the backend as `user_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Filter option types
// ============================================================================

/// Room count as understood by the search backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    One,
    Two,
    Three,
    Four,
    FiveMore,
}

impl RoomKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RoomKind::One => "one",
            RoomKind::Two => "two",
            RoomKind::Three => "three",
            RoomKind::Four => "four",
            RoomKind::FiveMore => "five_more",
        }
    }
}

/// Choice offered on the rooms keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomChoice {
    One,
    Two,
    ThreePlus,
    Any,
}

impl RoomChoice {
    pub const ALL: [RoomChoice; 4] = [
        RoomChoice::One,
        RoomChoice::Two,
        RoomChoice::ThreePlus,
        RoomChoice::Any,
    ];

    /// Map the cardinal choice to the set of backend room kinds.
    ///
    /// An empty set means "no room filter".
    pub fn room_kinds(self) -> Vec<RoomKind> {
        match self {
            RoomChoice::One => vec![RoomKind::One],
            RoomChoice::Two => vec![RoomKind::Two],
            RoomChoice::ThreePlus => vec![RoomKind::Three, RoomKind::Four, RoomKind::FiveMore],
            RoomChoice::Any => vec![],
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            RoomChoice::One => "1",
            RoomChoice::Two => "2",
            RoomChoice::ThreePlus => "3",
            RoomChoice::Any => "any",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|choice| choice.code() == code)
    }
}

/// Whether pets must be allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Pets {
    Tak,
    Nie,
}

impl Pets {
    pub fn as_str(self) -> &'static str {
        match self {
            Pets::Tak => "Tak",
            Pets::Nie => "Nie",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Tak" => Some(Pets::Tak),
            "Nie" => Some(Pets::Nie),
            _ => None,
        }
    }
}

/// Parking variants the backend can filter on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Parking {
    #[serde(rename = "w garażu")]
    Garage,
    #[serde(rename = "parking strzeżony")]
    Guarded,
}

impl Parking {
    pub const ALL: [Parking; 2] = [Parking::Garage, Parking::Guarded];

    /// Backend value
    pub fn as_str(self) -> &'static str {
        match self {
            Parking::Garage => "w garażu",
            Parking::Guarded => "parking strzeżony",
        }
    }

    /// Short ASCII code used in button payloads
    pub fn code(self) -> &'static str {
        match self {
            Parking::Garage => "garage",
            Parking::Guarded => "guarded",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }
}

/// User reaction to a listing card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Liked,
    Skipped,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Liked => "liked",
            Verdict::Skipped => "skipped",
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// In-progress search criteria.
///
/// Every field has an explicit "unset" value (`None` or an empty list), so a
/// search payload can always be built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    pub city: String,
    /// Selected districts in selection order
    pub districts: Vec<String>,
    /// Never collected by the conversation, always `None`
    pub price_min: Option<u32>,
    pub price_max: Option<u32>,
    /// Empty means any room count
    pub rooms: Vec<RoomKind>,
    pub pets: Option<Pets>,
    pub parking: Vec<Parking>,
    /// `Some(true)` means must-have; `None` and `Some(false)` both mean any
    pub elevator: Option<bool>,
}

impl Filters {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            districts: Vec::new(),
            price_min: None,
            price_max: None,
            rooms: Vec::new(),
            pets: None,
            parking: Vec::new(),
            elevator: None,
        }
    }

    pub fn toggle_district(&mut self, district: &str) {
        if let Some(pos) = self.districts.iter().position(|d| d == district) {
            self.districts.remove(pos);
        } else {
            self.districts.push(district.to_string());
        }
    }

    pub fn toggle_parking(&mut self, parking: Parking) {
        if let Some(pos) = self.parking.iter().position(|p| *p == parking) {
            self.parking.remove(pos);
        } else {
            self.parking.push(parking);
        }
    }

    pub fn elevator_required(&self) -> bool {
        self.elevator == Some(true)
    }
}

impl Default for Filters {
    fn default() -> Self {
        Self::new(DEFAULT_CITY)
    }
}

// ============================================================================
// Price input
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price is empty")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("price must be positive")]
    NotPositive,
    #[error("price is out of range")]
    OutOfRange,
}

/// Parse a free-text budget.
///
/// All whitespace is stripped before parsing, so "3 500" reads as 3500.
/// Fractions are rounded to the nearest integer.
pub fn parse_price(input: &str) -> Result<u32, PriceError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(PriceError::Empty);
    }

    let value: f64 = compact
        .parse()
        .map_err(|_| PriceError::NotANumber(compact.clone()))?;
    if !value.is_finite() {
        return Err(PriceError::NotANumber(compact));
    }
    if value <= 0.0 {
        return Err(PriceError::NotPositive);
    }

    let rounded = value.round();
    if rounded < 1.0 {
        return Err(PriceError::NotPositive);
    }
    if rounded > f64::from(u32::MAX) {
        return Err(PriceError::OutOfRange);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above
    let price = rounded as u32;
    Ok(price)
}

// ============================================================================
// Listing
// ============================================================================

/// A rental offer from the feed
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Listing {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price_value: Option<f64>,
    #[serde(default)]
    pub url: String,
}

/// Short, fixed-length stand-in for a listing id in button payloads.
///
/// Telegram caps callback data at 64 bytes and feed ids can be whole URLs.
pub fn card_token(listing_id: &str) -> String {
    let hash = Sha256::digest(listing_id.as_bytes());
    hash.iter().take(CARD_TOKEN_BYTES).map(|b| format!("{b:02x}")).collect()
}

const CARD_TOKEN_BYTES: usize = 8;

/// Accept identifiers sent either as JSON strings or as numbers.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

// ============================================================================
// Conversation steps and flow
// ============================================================================

/// Position in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    /// Nothing in progress, waiting for /start
    #[default]
    Idle,
    Districts,
    Price,
    Rooms,
    Pets,
    Parking,
    Elevator,
    Confirm,
    /// Search submitted, feed not loaded yet
    Searching,
    /// Triage of the listing queue
    Showing,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Idle => "idle",
            Step::Districts => "districts",
            Step::Price => "price",
            Step::Rooms => "rooms",
            Step::Pets => "pets",
            Step::Parking => "parking",
            Step::Elevator => "elevator",
            Step::Confirm => "confirm",
            Step::Searching => "searching",
            Step::Showing => "showing",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection steps in the order they are asked
const COLLECTION_ORDER: [Step; 7] = [
    Step::Districts,
    Step::Price,
    Step::Rooms,
    Step::Pets,
    Step::Parking,
    Step::Elevator,
    Step::Confirm,
];

/// Collection steps that a deployment may switch off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionalStep {
    Districts,
    Pets,
    Parking,
    Elevator,
    Confirm,
}

impl OptionalStep {
    pub const ALL: [OptionalStep; 5] = [
        OptionalStep::Districts,
        OptionalStep::Pets,
        OptionalStep::Parking,
        OptionalStep::Elevator,
        OptionalStep::Confirm,
    ];

    pub fn step(self) -> Step {
        match self {
            OptionalStep::Districts => Step::Districts,
            OptionalStep::Pets => Step::Pets,
            OptionalStep::Parking => Step::Parking,
            OptionalStep::Elevator => Step::Elevator,
            OptionalStep::Confirm => Step::Confirm,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.step().as_str() == name)
    }
}

/// Which optional steps a conversation walks through.
///
/// Price and rooms are always asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    enabled: BTreeSet<OptionalStep>,
}

impl Flow {
    /// Every optional step enabled
    pub fn full() -> Self {
        Self::with_steps(OptionalStep::ALL)
    }

    /// Price and rooms only; the search starts right after rooms
    pub fn minimal() -> Self {
        Self {
            enabled: BTreeSet::new(),
        }
    }

    pub fn with_steps(steps: impl IntoIterator<Item = OptionalStep>) -> Self {
        Self {
            enabled: steps.into_iter().collect(),
        }
    }

    pub fn is_enabled(&self, step: Step) -> bool {
        match step {
            Step::Price | Step::Rooms => true,
            Step::Districts | Step::Pets | Step::Parking | Step::Elevator | Step::Confirm => self
                .enabled
                .iter()
                .any(|optional| optional.step() == step),
            Step::Idle | Step::Searching | Step::Showing => false,
        }
    }

    pub fn enabled_steps(&self) -> impl Iterator<Item = OptionalStep> + '_ {
        self.enabled.iter().copied()
    }

    /// First collection step after /start
    pub fn first_step(&self) -> Step {
        self.next_after(Step::Idle)
    }

    /// Next enabled collection step, or `Searching` once all are answered
    pub fn next_after(&self, step: Step) -> Step {
        let start = COLLECTION_ORDER
            .iter()
            .position(|s| *s == step)
            .map_or(0, |i| i + 1);
        COLLECTION_ORDER[start..]
            .iter()
            .copied()
            .find(|s| self.is_enabled(*s))
            .unwrap_or(Step::Searching)
    }
}

impl Default for Flow {
    fn default() -> Self {
        Self::full()
    }
}

// ============================================================================
// Session
// ============================================================================

/// Per-user conversation state
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub step: Step,
    pub filters: Filters,
    /// Listings not shown yet, front is next
    pub queue: VecDeque<Listing>,
    /// Listing whose card is awaiting a reaction
    pub current: Option<String>,
}

impl Session {
    pub fn fresh(city: &str) -> Self {
        Self {
            step: Step::Idle,
            filters: Filters::new(city),
            queue: VecDeque::new(),
            current: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::fresh(DEFAULT_CITY)
    }
}

/// Settings shared by every session (immutable configuration)
#[derive(Debug, Clone)]
pub struct FlowContext {
    pub default_city: String,
    pub feed_limit: u32,
    pub flow: Flow,
}

impl FlowContext {
    pub fn new(default_city: impl Into<String>, feed_limit: u32, flow: Flow) -> Self {
        Self {
            default_city: default_city.into(),
            feed_limit,
            flow,
        }
    }
}

impl Default for FlowContext {
    fn default() -> Self {
        Self::new(DEFAULT_CITY, DEFAULT_FEED_LIMIT, Flow::full())
    }
}
