// src/models/image.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::errors::GuideError;

/// Which catalog table an image set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOwner {
    Place,
    Accommodation,
}

impl ImageOwner {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageOwner::Place => "place",
            ImageOwner::Accommodation => "accommodation",
        }
    }
}

impl FromStr for ImageOwner {
    type Err = GuideError;

    /// Accepts both the singular kind and the plural route segment
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "place" | "places" => Ok(ImageOwner::Place),
            "accommodation" | "accommodations" => Ok(ImageOwner::Accommodation),
            other => Err(GuideError::InvalidInput(format!(
                "images can not be attached to '{}'",
                other
            ))),
        }
    }
}

/// One image of a place or accommodation image set
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlaceImage {
    pub id: Uuid,
    pub owner_kind: String,
    pub owner_id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub is_thumbnail: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddImageRequest {
    #[validate(url)]
    pub url: String,
    #[validate(length(max = 500))]
    pub alt_text: Option<String>,
    /// Make this the set's thumbnail, replacing the current one
    #[serde(default)]
    pub is_thumbnail: bool,
    /// Appended after the last image when absent
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReorderImagesRequest {
    /// Every image id of the set, in the new display order
    pub image_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageResponse {
    pub id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub is_thumbnail: bool,
    pub sort_order: i32,
}

impl PlaceImage {
    pub fn to_response(&self) -> ImageResponse {
        ImageResponse {
            id: self.id,
            url: self.url.clone(),
            alt_text: self.alt_text.clone(),
            is_thumbnail: self.is_thumbnail,
            sort_order: self.sort_order,
        }
    }
}

/// How adding an image affects the set's thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailPlan {
    pub is_thumbnail: bool,
    /// The current thumbnail must be unset first
    pub clear_existing: bool,
}

/// The first image of a set is always its thumbnail; a requested thumbnail
/// replaces the existing one
pub fn plan_thumbnail(requested: bool, existing_images: i64) -> ThumbnailPlan {
    let is_thumbnail = requested || existing_images == 0;
    ThumbnailPlan {
        is_thumbnail,
        clear_existing: is_thumbnail && existing_images > 0,
    }
}

/// Image taking over as thumbnail when the thumbnail is deleted:
/// first in display order, oldest on ties
pub fn thumbnail_successor(remaining: &[PlaceImage]) -> Option<Uuid> {
    remaining
        .iter()
        .min_by_key(|img| (img.sort_order, img.created_at))
        .map(|img| img.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_from_route_segment() {
        assert_eq!("places".parse::<ImageOwner>().unwrap(), ImageOwner::Place);
        assert_eq!(
            "accommodation".parse::<ImageOwner>().unwrap(),
            ImageOwner::Accommodation
        );
        assert!("itineraries".parse::<ImageOwner>().is_err());
    }

    #[test]
    fn test_add_image_requires_url() {
        let req = AddImageRequest {
            url: "not a url".to_string(),
            alt_text: None,
            is_thumbnail: false,
            sort_order: None,
        };
        assert!(req.validate().is_err());

        let req = AddImageRequest {
            url: "https://cdn.example.com/po-nagar.jpg".to_string(),
            ..req
        };
        assert!(req.validate().is_ok());
    }

    fn image(sort_order: i32, age_secs: i64) -> PlaceImage {
        PlaceImage {
            id: Uuid::new_v4(),
            owner_kind: "place".to_string(),
            owner_id: Uuid::nil(),
            url: "https://cdn.example.com/x.jpg".to_string(),
            alt_text: None,
            is_thumbnail: false,
            sort_order,
            created_at: Utc::now() - chrono::Duration::seconds(age_secs),
        }
    }

    #[test]
    fn test_first_image_becomes_thumbnail() {
        let plan = plan_thumbnail(false, 0);
        assert!(plan.is_thumbnail);
        assert!(!plan.clear_existing);

        let plan = plan_thumbnail(true, 0);
        assert!(plan.is_thumbnail);
        assert!(!plan.clear_existing);
    }

    #[test]
    fn test_requested_thumbnail_replaces_existing() {
        assert_eq!(
            plan_thumbnail(true, 3),
            ThumbnailPlan {
                is_thumbnail: true,
                clear_existing: true
            }
        );
        assert_eq!(
            plan_thumbnail(false, 3),
            ThumbnailPlan {
                is_thumbnail: false,
                clear_existing: false
            }
        );
    }

    #[test]
    fn test_successor_is_first_in_display_order() {
        let a = image(2, 300);
        let b = image(0, 10);
        let c = image(0, 200);
        let expected = c.id;

        assert_eq!(thumbnail_successor(&[a, b, c]), Some(expected));
        assert_eq!(thumbnail_successor(&[]), None);
    }
}
