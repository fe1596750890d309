// src/models/itinerary.rs
// DOCUMENTATION: Itinerary, day and item records plus their request/response DTOs
// PURPOSE: A date-ranged trip holding timed visits to places or accommodations

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::time_format;
use super::TravelMode;

pub const MAX_TRIP_DAYS: i64 = 30;
pub const MAX_ITEMS_PER_DAY: usize = 30;

#[derive(Debug, Clone, FromRow)]
pub struct Itinerary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub share_token: String,
    pub edit_token: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ItineraryDay {
    pub id: Uuid,
    pub itinerary_id: Uuid,
    pub day_number: i32,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

/// Item row joined with the name and coordinates of the referenced stop
#[derive(Debug, Clone, FromRow)]
pub struct ItineraryItemRow {
    pub id: Uuid,
    pub day_id: Uuid,
    pub place_id: Option<Uuid>,
    pub accommodation_id: Option<Uuid>,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub travel_mode: Option<String>,
    pub notes: Option<String>,
    pub sort_order: i32,
    pub stop_name: Option<String>,
    pub stop_category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Body of POST /itineraries and PUT /itineraries/{id}
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveItineraryRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    #[serde(default = "default_public")]
    pub is_public: bool,

    /// Days omitted here are stored empty
    #[serde(default)]
    pub days: Vec<DayInput>,
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayInput {
    pub day_number: i32,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInput {
    pub place_id: Option<Uuid>,
    pub accommodation_id: Option<Uuid>,
    #[serde(with = "time_format")]
    pub start_time: NaiveTime,
    #[serde(default, with = "time_format::option")]
    pub end_time: Option<NaiveTime>,
    /// Mode used to reach this stop from the previous one
    pub travel_mode: Option<TravelMode>,
    pub notes: Option<String>,
}

/// What an itinerary item points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRef {
    Place(Uuid),
    Accommodation(Uuid),
}

impl StopRef {
    pub fn kind(&self) -> &'static str {
        match self {
            StopRef::Place(_) => "place",
            StopRef::Accommodation(_) => "accommodation",
        }
    }

    pub fn place_id(&self) -> Option<Uuid> {
        match self {
            StopRef::Place(id) => Some(*id),
            StopRef::Accommodation(_) => None,
        }
    }

    pub fn accommodation_id(&self) -> Option<Uuid> {
        match self {
            StopRef::Accommodation(id) => Some(*id),
            StopRef::Place(_) => None,
        }
    }
}

/// A day after validation: numbered, dated, items sorted
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDay {
    pub day_number: i32,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub items: Vec<NormalizedItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItem {
    pub stop: StopRef,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub travel_mode: Option<TravelMode>,
    pub notes: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    pub id: Uuid,
    /// "place" or "accommodation"
    pub kind: &'static str,
    pub place_id: Option<Uuid>,
    pub accommodation_id: Option<Uuid>,
    pub name: String,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(with = "time_format")]
    pub start_time: NaiveTime,
    #[serde(with = "time_format::option")]
    pub end_time: Option<NaiveTime>,
    pub travel_mode: Option<TravelMode>,
    pub notes: Option<String>,
    pub sort_order: i32,
}

impl ItemResponse {
    pub fn location(&self) -> Option<Point<f64>> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Point::new(lng, lat)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayResponse {
    pub id: Uuid,
    pub day_number: i32,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub items: Vec<ItemResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItineraryResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_public: bool,
    pub share_token: String,
    pub share_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub days: Vec<DayResponse>,
}

/// Returned once, on creation: the only time the edit token is disclosed
#[derive(Debug, Serialize)]
pub struct CreatedItineraryResponse {
    #[serde(flatten)]
    pub itinerary: ItineraryResponse,
    pub edit_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req: SaveItineraryRequest = serde_json::from_value(serde_json::json!({
            "title": "Ba ngày ở Nha Trang",
            "start_date": "2026-11-02",
            "end_date": "2026-11-04"
        }))
        .unwrap();
        assert!(req.is_public);
        assert!(req.days.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_item_input_times() {
        let item: ItemInput = serde_json::from_value(serde_json::json!({
            "place_id": "6f1c2a52-8f8e-4d36-9a57-0c3c1f1f2a10",
            "start_time": "09:00",
            "travel_mode": "walking"
        }))
        .unwrap();
        assert_eq!(item.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(item.end_time.is_none());
        assert_eq!(item.travel_mode, Some(TravelMode::Walking));
    }

    #[test]
    fn test_stop_ref_accessors() {
        let id = Uuid::new_v4();
        let stop = StopRef::Accommodation(id);
        assert_eq!(stop.kind(), "accommodation");
        assert_eq!(stop.accommodation_id(), Some(id));
        assert_eq!(stop.place_id(), None);
    }
}
