//! Wire types of the search backend

use crate::state_machine::state::{deserialize_id, Filters, Parking, Pets, RoomKind, Verdict};
use crate::state_machine::UserId;
use serde::{Deserialize, Serialize};

/// Body of `POST /search`
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub user_id: UserId,
    pub filters: SearchFilters<'a>,
    pub limit: u32,
}

/// Filters as the backend expects them: every key present, "any" as
/// `null` or `[]`.
#[derive(Debug, Serialize)]
pub struct SearchFilters<'a> {
    pub city: &'a str,
    pub districts: &'a [String],
    pub price_min: Option<u32>,
    pub price_max: Option<u32>,
    pub rooms: &'a [RoomKind],
    pub pets: Option<Pets>,
    pub parking: &'a [Parking],
    /// `true` or `null`, never `false`
    pub elevator: Option<bool>,
}

impl<'a> From<&'a Filters> for SearchFilters<'a> {
    fn from(filters: &'a Filters) -> Self {
        Self {
            city: &filters.city,
            districts: &filters.districts,
            price_min: filters.price_min,
            price_max: filters.price_max,
            rooms: &filters.rooms,
            pets: filters.pets,
            parking: &filters.parking,
            elevator: filters.elevator_required().then_some(true),
        }
    }
}

/// Response of `POST /search`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchJob {
    #[serde(deserialize_with = "deserialize_id")]
    pub job_id: String,
}

/// Query of `GET /feed`
#[derive(Debug, Serialize)]
pub struct FeedQuery {
    pub user_id: UserId,
    pub limit: u32,
}

/// Body of `POST /state`
#[derive(Debug, Serialize)]
pub struct StateReport<'a> {
    pub user_id: UserId,
    pub listing_id: &'a str,
    pub state: Verdict,
}
