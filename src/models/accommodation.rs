// src/models/accommodation.rs
// DOCUMENTATION: Hotels, resorts, homestays and other places to stay

use chrono::{DateTime, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::{ImageResponse, ListingSort};
use crate::errors::GuideError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccommodationType {
    Hotel,
    Resort,
    Homestay,
    Hostel,
    Apartment,
    Villa,
}

impl AccommodationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccommodationType::Hotel => "hotel",
            AccommodationType::Resort => "resort",
            AccommodationType::Homestay => "homestay",
            AccommodationType::Hostel => "hostel",
            AccommodationType::Apartment => "apartment",
            AccommodationType::Villa => "villa",
        }
    }
}

impl FromStr for AccommodationType {
    type Err = GuideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hotel" => Ok(AccommodationType::Hotel),
            "resort" => Ok(AccommodationType::Resort),
            "homestay" => Ok(AccommodationType::Homestay),
            "hostel" => Ok(AccommodationType::Hostel),
            "apartment" => Ok(AccommodationType::Apartment),
            "villa" => Ok(AccommodationType::Villa),
            other => Err(GuideError::InvalidInput(format!(
                "unknown accommodation type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Accommodation {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub accommodation_type: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub star_rating: Option<i32>,
    pub rating: Option<f32>,
    pub review_count: i32,
    /// Nightly price range in VND
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub amenities: Vec<String>,
    pub beach_distance_m: Option<i32>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub booking_url: Option<String>,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[sqlx(default)]
    pub thumbnail_url: Option<String>,

    #[sqlx(default)]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateAccommodationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    pub accommodation_type: AccommodationType,

    pub description: Option<String>,

    pub address: Option<String>,

    #[validate(length(max = 128))]
    pub district: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    #[validate(range(min = 1, max = 5))]
    pub star_rating: Option<i32>,

    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f32>,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub review_count: i32,

    #[validate(range(min = 0))]
    pub price_min: Option<i64>,

    #[validate(range(min = 0))]
    pub price_max: Option<i64>,

    #[serde(default)]
    pub amenities: Vec<String>,

    #[validate(range(min = 0))]
    pub beach_distance_m: Option<i32>,

    #[validate(length(max = 64))]
    pub phone: Option<String>,

    #[validate(url)]
    pub website: Option<String>,

    #[validate(url)]
    pub booking_url: Option<String>,

    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAccommodationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub accommodation_type: Option<AccommodationType>,
    pub description: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 128))]
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(range(min = 1, max = 5))]
    pub star_rating: Option<i32>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f32>,
    #[validate(range(min = 0))]
    pub review_count: Option<i32>,
    #[validate(range(min = 0))]
    pub price_min: Option<i64>,
    #[validate(range(min = 0))]
    pub price_max: Option<i64>,
    pub amenities: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub beach_distance_m: Option<i32>,
    #[validate(length(max = 64))]
    pub phone: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(url)]
    pub booking_url: Option<String>,
    pub is_featured: Option<bool>,
}

/// Both bounds of a nightly price range, when present, must be ordered
pub fn check_price_range(min: Option<i64>, max: Option<i64>) -> Result<(), GuideError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(GuideError::ValidationError(format!(
                "price_min ({}) must not exceed price_max ({})",
                min, max
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccommodationResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub accommodation_type: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub star_rating: Option<i32>,
    pub rating: Option<f32>,
    pub review_count: i32,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub amenities: Vec<String>,
    pub beach_distance_m: Option<i32>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub booking_url: Option<String>,
    pub is_featured: bool,
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AccommodationDetailResponse {
    #[serde(flatten)]
    pub accommodation: AccommodationResponse,
    pub images: Vec<ImageResponse>,
}

/// Query string of GET /accommodations
#[derive(Debug, Default, Deserialize)]
pub struct AccommodationQuery {
    #[serde(rename = "type")]
    pub accommodation_type: Option<AccommodationType>,
    pub q: Option<String>,
    pub district: Option<String>,
    pub min_rating: Option<f32>,
    pub min_stars: Option<i32>,
    /// Upper bound on the cheapest nightly price
    pub max_price: Option<i64>,
    /// Lower bound on the most expensive nightly price
    pub min_price: Option<i64>,
    /// Comma separated, all must be present
    pub amenities: Option<String>,
    pub max_beach_distance_m: Option<i32>,
    pub featured: Option<bool>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub sort: Option<ListingSort>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl AccommodationQuery {
    pub fn amenity_list(&self) -> Vec<String> {
        self.amenities
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect()
    }
}

impl Accommodation {
    pub fn location(&self) -> Option<Point<f64>> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Point::new(lng, lat)),
            _ => None,
        }
    }

    pub fn to_response(&self) -> AccommodationResponse {
        AccommodationResponse {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            accommodation_type: self.accommodation_type.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            district: self.district.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            star_rating: self.star_rating,
            rating: self.rating,
            review_count: self.review_count,
            price_min: self.price_min,
            price_max: self.price_max,
            amenities: self.amenities.clone(),
            beach_distance_m: self.beach_distance_m,
            phone: self.phone.clone(),
            website: self.website.clone(),
            booking_url: self.booking_url.clone(),
            is_featured: self.is_featured,
            thumbnail_url: self.thumbnail_url.clone(),
            distance_km: self.distance_km,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_check() {
        assert!(check_price_range(Some(500_000), Some(1_200_000)).is_ok());
        assert!(check_price_range(None, Some(1_200_000)).is_ok());
        assert!(check_price_range(Some(2_000_000), Some(1_000_000)).is_err());
    }

    #[test]
    fn test_amenity_list_normalises() {
        let query = AccommodationQuery {
            amenities: Some("Pool, wifi,,  Breakfast ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.amenity_list(), vec!["pool", "wifi", "breakfast"]);
        assert!(AccommodationQuery::default().amenity_list().is_empty());
    }

    #[test]
    fn test_type_query_param() {
        let query: AccommodationQuery =
            serde_json::from_value(serde_json::json!({"type": "resort", "min_stars": 4})).unwrap();
        assert_eq!(query.accommodation_type, Some(AccommodationType::Resort));
        assert_eq!(query.min_stars, Some(4));
        assert!("castle".parse::<AccommodationType>().is_err());
    }
}
