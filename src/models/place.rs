// src/models/place.rs
// DOCUMENTATION: Core data structures for places
// PURPOSE: Restaurants, attractions, activities and shopping venues

use chrono::{DateTime, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::ImageResponse;
use crate::errors::GuideError;

/// Listing category of a place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Restaurant,
    Attraction,
    Activity,
    Shopping,
}

impl PlaceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::Restaurant => "restaurant",
            PlaceCategory::Attraction => "attraction",
            PlaceCategory::Activity => "activity",
            PlaceCategory::Shopping => "shopping",
        }
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceCategory {
    type Err = GuideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "restaurant" | "restaurants" | "food" => Ok(PlaceCategory::Restaurant),
            "attraction" | "attractions" | "sightseeing" => Ok(PlaceCategory::Attraction),
            "activity" | "activities" => Ok(PlaceCategory::Activity),
            "shopping" | "shop" => Ok(PlaceCategory::Shopping),
            other => Err(GuideError::InvalidInput(format!(
                "unknown place category '{}'",
                other
            ))),
        }
    }
}

/// Build a point from optional coordinates; both or neither must be present
pub fn point_from(latitude: Option<f64>, longitude: Option<f64>) -> Result<Option<Point<f64>>, GuideError> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(GuideError::ValidationError(format!(
                    "coordinates out of range: {}, {}",
                    lat, lng
                )));
            }
            Ok(Some(Point::new(lng, lat)))
        }
        (None, None) => Ok(None),
        _ => Err(GuideError::ValidationError(
            "latitude and longitude must be provided together".to_string(),
        )),
    }
}

/// Place record from the places table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f32>,
    pub review_count: i32,
    /// 0 (free) to 4 (very expensive)
    pub price_level: Option<i32>,
    pub opening_hours: Option<Value>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub tags: Vec<String>,
    pub cuisine_types: Vec<String>,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Thumbnail of the image set, joined in listing queries
    #[sqlx(default)]
    pub thumbnail_url: Option<String>,

    /// Distance from the search origin, only set for proximity searches
    #[sqlx(default)]
    pub distance_km: Option<f64>,
}

/// Request DTO for POST /admin/places
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreatePlaceRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Derived from the name when absent
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    pub category: PlaceCategory,

    pub description: Option<String>,

    pub address: Option<String>,

    #[validate(length(max = 128))]
    pub district: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f32>,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub review_count: i32,

    #[validate(range(min = 0, max = 4))]
    pub price_level: Option<i32>,

    #[serde(default)]
    pub opening_hours: Option<Value>,

    #[validate(length(max = 64))]
    pub phone: Option<String>,

    #[validate(url)]
    pub website: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub cuisine_types: Vec<String>,

    #[serde(default)]
    pub is_featured: bool,
}

/// Request DTO for PUT /admin/places/{id}
/// DOCUMENTATION: All fields are optional - only provided fields are updated
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePlaceRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub category: Option<PlaceCategory>,
    pub description: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 128))]
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f32>,
    #[validate(range(min = 0))]
    pub review_count: Option<i32>,
    #[validate(range(min = 0, max = 4))]
    pub price_level: Option<i32>,
    pub opening_hours: Option<Value>,
    #[validate(length(max = 64))]
    pub phone: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    pub tags: Option<Vec<String>>,
    pub cuisine_types: Option<Vec<String>>,
    pub is_featured: Option<bool>,
}

/// Response DTO for API consumers
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f32>,
    pub review_count: i32,
    pub price_level: Option<i32>,
    pub opening_hours: Option<Value>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub tags: Vec<String>,
    pub cuisine_types: Vec<String>,
    pub is_featured: bool,
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// GET /places/{id} response with the full image set
#[derive(Debug, Serialize)]
pub struct PlaceDetailResponse {
    #[serde(flatten)]
    pub place: PlaceResponse,
    pub images: Vec<ImageResponse>,
}

/// Sort order for catalog listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingSort {
    #[default]
    Rating,
    Name,
    Newest,
    Distance,
    Price,
}

/// Query string of GET /places
#[derive(Debug, Default, Deserialize)]
pub struct PlaceQuery {
    pub category: Option<PlaceCategory>,
    /// Case-insensitive substring over name and description
    pub q: Option<String>,
    pub district: Option<String>,
    pub min_rating: Option<f32>,
    pub min_price_level: Option<i32>,
    pub max_price_level: Option<i32>,
    pub tag: Option<String>,
    pub featured: Option<bool>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub sort: Option<ListingSort>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Place {
    pub fn location(&self) -> Option<Point<f64>> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Point::new(lng, lat)),
            _ => None,
        }
    }

    pub fn to_response(&self) -> PlaceResponse {
        PlaceResponse {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            district: self.district.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            rating: self.rating,
            review_count: self.review_count,
            price_level: self.price_level,
            opening_hours: self.opening_hours.clone(),
            phone: self.phone.clone(),
            website: self.website.clone(),
            tags: self.tags.clone(),
            cuisine_types: self.cuisine_types.clone(),
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
    fn test_category_parsing() {
        assert_eq!("Restaurant".parse::<PlaceCategory>().unwrap(), PlaceCategory::Restaurant);
        assert_eq!("activities".parse::<PlaceCategory>().unwrap(), PlaceCategory::Activity);
        assert!("nightlife".parse::<PlaceCategory>().is_err());
    }

    #[test]
    fn test_point_from_requires_both() {
        let p = point_from(Some(12.2388), Some(109.1967)).unwrap().unwrap();
        assert_eq!(p.x(), 109.1967);
        assert_eq!(p.y(), 12.2388);

        assert!(point_from(None, None).unwrap().is_none());
        assert!(point_from(Some(12.0), None).is_err());
        assert!(point_from(Some(120.0), Some(109.0)).is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let json = serde_json::json!({
            "name": "Lac Canh",
            "category": "restaurant",
            "latitude": 12.2521,
            "longitude": 109.1935,
            "rating": 4.4,
            "price_level": 2,
            "tags": ["bbq", "local"]
        });
        let req: CreatePlaceRequest = serde_json::from_value(json).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.review_count, 0);

        let bad = CreatePlaceRequest {
            rating: Some(7.0),
            price_level: Some(9),
            ..req
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("rating"));
        assert!(fields.contains_key("price_level"));
    }

    #[test]
    fn test_query_parses_sort_and_category() {
        let query: PlaceQuery =
            serde_json::from_value(serde_json::json!({"category": "shopping", "sort": "distance"}))
                .unwrap();
        assert_eq!(query.category, Some(PlaceCategory::Shopping));
        assert_eq!(query.sort, Some(ListingSort::Distance));
    }
}
