// src/models/travel.rs
// DOCUMENTATION: Travel-time estimate types
// PURPOSE: Modes, locales and the estimate DTOs returned by /travel and itinerary legs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::GuideError;

/// How a traveller moves between two stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walking,
    Driving,
    Transit,
}

impl TravelMode {
    pub const ALL: [TravelMode; 3] = [TravelMode::Walking, TravelMode::Driving, TravelMode::Transit];

    /// Assumed average speed in km/h
    pub fn speed_kmh(&self) -> f64 {
        match self {
            TravelMode::Walking => 5.0,
            TravelMode::Driving => 30.0,
            TravelMode::Transit => 20.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
            TravelMode::Driving => "driving",
            TravelMode::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = GuideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "walking" | "walk" => Ok(TravelMode::Walking),
            "driving" | "drive" | "car" | "taxi" | "motorbike" => Ok(TravelMode::Driving),
            "transit" | "bus" => Ok(TravelMode::Transit),
            other => Err(GuideError::InvalidInput(format!("unknown travel mode '{}'", other))),
        }
    }
}

/// Display language for formatted durations and distances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Vi,
    En,
}

impl Locale {
    /// Parse a language tag such as "vi", "en-US" or "VI"; None for anything else
    pub fn parse(tag: &str) -> Option<Locale> {
        let primary = tag.trim().split(['-', '_']).next().unwrap_or("").to_lowercase();
        match primary.as_str() {
            "vi" => Some(Locale::Vi),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    /// Requested locale, falling back to the configured default, then Vietnamese
    pub fn resolve(requested: Option<&str>, default: &str) -> Locale {
        requested
            .and_then(Locale::parse)
            .or_else(|| Locale::parse(default))
            .unwrap_or(Locale::Vi)
    }
}

/// Estimate for a single mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelEstimate {
    pub mode: TravelMode,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub distance_text: String,
    pub duration_text: String,
}

/// Estimates for every mode between the same two points
#[derive(Debug, Clone, Serialize)]
pub struct TravelOptions {
    pub distance_km: f64,
    pub distance_text: String,
    pub suggested_mode: TravelMode,
    pub estimates: Vec<TravelEstimate>,
}

/// Query string of GET /travel/estimate
#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub from_lat: f64,
    pub from_lng: f64,
    pub to_lat: f64,
    pub to_lng: f64,
    pub mode: Option<TravelMode>,
    pub lang: Option<String>,
}

/// Query string carrying only the language
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Movement between two consecutive stops of an itinerary day
#[derive(Debug, Clone, Serialize)]
pub struct TravelLeg {
    pub day_number: i32,
    pub from_item_id: Uuid,
    pub to_item_id: Uuid,
    pub from_name: String,
    pub to_name: String,
    /// None when either stop has no known coordinates
    pub distance_km: Option<f64>,
    /// Estimate for the mode chosen on the destination stop, or the suggested one
    pub estimate: Option<TravelEstimate>,
    /// All modes, only when the stop has no chosen mode
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<TravelEstimate>,
    /// Travel does not fit between the previous stop and the next start time
    pub tight_schedule: bool,
}

#[derive(Debug, Serialize)]
pub struct ItineraryTravelResponse {
    pub itinerary_id: Uuid,
    pub locale: Locale,
    pub total_distance_km: f64,
    pub total_minutes: u32,
    pub legs: Vec<TravelLeg>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_speeds() {
        assert_eq!(TravelMode::Walking.speed_kmh(), 5.0);
        assert_eq!(TravelMode::Driving.speed_kmh(), 30.0);
        assert_eq!(TravelMode::Transit.speed_kmh(), 20.0);
    }

    #[test]
    fn test_mode_aliases() {
        assert_eq!("Taxi".parse::<TravelMode>().unwrap(), TravelMode::Driving);
        assert_eq!("bus".parse::<TravelMode>().unwrap(), TravelMode::Transit);
        assert!("boat".parse::<TravelMode>().is_err());
    }

    #[test]
    fn test_locale_resolution() {
        assert_eq!(Locale::resolve(Some("en-US"), "vi"), Locale::En);
        assert_eq!(Locale::resolve(Some("fr"), "en"), Locale::En);
        assert_eq!(Locale::resolve(None, "vi"), Locale::Vi);
        assert_eq!(Locale::resolve(None, "xx"), Locale::Vi);
    }
}
