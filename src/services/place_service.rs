// src/services/place_service.rs
// DOCUMENTATION: Business logic for places
// PURPOSE: Intermediary between handlers and repository, handles extra logic

use crate::db::{ImageRepository, PlaceRepository};
use crate::errors::GuideError;
use crate::models::{
    point_from, CreatePlaceRequest, ImageOwner, Page, PlaceDetailResponse, PlaceQuery,
    PlaceResponse, UpdatePlaceRequest,
};
use crate::services::slug::{next_free_slug, slugify};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Outcome of a bulk import; failing rows do not stop the batch
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub received: usize,
    pub created: Vec<ImportedPlace>,
    pub failed: Vec<ImportFailure>,
}

#[derive(Debug, Serialize)]
pub struct ImportedPlace {
    pub index: usize,
    pub id: Uuid,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct ImportFailure {
    pub index: usize,
    pub name: Option<String>,
    pub error: String,
}

/// Trim, lowercase and dedupe tags, dropping blanks
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Proximity parameters of a listing query: a radius needs an origin,
/// and the origin must be a valid coordinate pair
pub fn check_listing_origin(
    lat: Option<f64>,
    lng: Option<f64>,
    radius_km: Option<f64>,
) -> Result<(), GuideError> {
    let origin = point_from(lat, lng)?;
    match radius_km {
        Some(_) if origin.is_none() => Err(GuideError::InvalidInput(
            "radius_km requires lat and lng".to_string(),
        )),
        Some(r) if r.is_nan() || r <= 0.0 => Err(GuideError::InvalidInput(
            "radius_km must be positive".to_string(),
        )),
        _ => Ok(()),
    }
}

pub struct PlaceService;

impl PlaceService {
    /// Create a new place with a unique slug derived from the name
    pub async fn create_place(
        pool: &PgPool,
        mut req: CreatePlaceRequest,
    ) -> Result<PlaceResponse, GuideError> {
        req.validate()?;
        point_from(req.latitude, req.longitude)?;

        let base = slugify(req.slug.as_deref().unwrap_or(&req.name));
        if base.is_empty() {
            return Err(GuideError::ValidationError(format!(
                "can not derive a slug from '{}'",
                req.name
            )));
        }
        let taken = PlaceRepository::slugs_like(pool, &base).await?;
        let slug = next_free_slug(&base, &taken);

        req.tags = normalize_tags(&req.tags);
        req.cuisine_types = normalize_tags(&req.cuisine_types);

        let place = PlaceRepository::create_place(pool, &slug, &req).await?;
        Ok(place.to_response())
    }

    /// Get a place by UUID or slug, with its image set
    pub async fn get_place(pool: &PgPool, identifier: &str) -> Result<PlaceDetailResponse, GuideError> {
        let place = match Uuid::parse_str(identifier) {
            Ok(id) => PlaceRepository::get_by_id(pool, id).await?,
            Err(_) => PlaceRepository::get_by_slug(pool, identifier).await?,
        };
        let images = ImageRepository::list(pool, ImageOwner::Place, place.id).await?;

        Ok(PlaceDetailResponse {
            place: place.to_response(),
            images: images.iter().map(|i| i.to_response()).collect(),
        })
    }

    pub async fn search_places(
        pool: &PgPool,
        query: PlaceQuery,
    ) -> Result<Page<PlaceResponse>, GuideError> {
        check_listing_origin(query.lat, query.lng, query.radius_km)?;
        if let (Some(min), Some(max)) = (query.min_price_level, query.max_price_level) {
            if min > max {
                return Err(GuideError::InvalidInput(
                    "min_price_level must not exceed max_price_level".to_string(),
                ));
            }
        }

        let (places, total) = PlaceRepository::search(pool, &query).await?;
        let (page, limit) = crate::models::page_and_limit(query.page, query.limit);

        Ok(Page::new(
            places.iter().map(|p| p.to_response()).collect(),
            total,
            page,
            limit,
        ))
    }

    pub async fn update_place(
        pool: &PgPool,
        id: Uuid,
        mut req: UpdatePlaceRequest,
    ) -> Result<PlaceResponse, GuideError> {
        req.validate()?;
        point_from(req.latitude, req.longitude)?;
        req.tags = req.tags.map(|t| normalize_tags(&t));
        req.cuisine_types = req.cuisine_types.map(|c| normalize_tags(&c));

        PlaceRepository::update_place(pool, id, &req).await?;
        // Re-read to pick up the thumbnail join
        let place = PlaceRepository::get_by_id(pool, id).await?;
        Ok(place.to_response())
    }

    pub async fn delete_place(pool: &PgPool, id: Uuid) -> Result<(), GuideError> {
        PlaceRepository::delete_place(pool, id).await
    }

    /// Create every row that parses and validates, collecting failures by index
    pub async fn import_places(
        pool: &PgPool,
        rows: Vec<serde_json::Value>,
    ) -> Result<ImportReport, GuideError> {
        let mut report = ImportReport {
            received: rows.len(),
            ..Default::default()
        };

        for (index, row) in rows.into_iter().enumerate() {
            let name = row
                .get("name")
                .and_then(|n| n.as_str())
                .map(str::to_string);

            let req: CreatePlaceRequest = match serde_json::from_value(row) {
                Ok(req) => req,
                Err(e) => {
                    report.failed.push(ImportFailure {
                        index,
                        name,
                        error: format!("Invalid row: {}", e),
                    });
                    continue;
                }
            };

            match Self::create_place(pool, req).await {
                Ok(place) => report.created.push(ImportedPlace {
                    index,
                    id: place.id,
                    slug: place.slug,
                }),
                // Database failures abort the batch
                Err(GuideError::DatabaseError(e)) => return Err(GuideError::DatabaseError(e)),
                Err(e) => report.failed.push(ImportFailure {
                    index,
                    name,
                    error: e.to_string(),
                }),
            }
        }

        log::info!(
            "Place import finished: {} received, {} created, {} failed",
            report.received,
            report.created.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            " Seafood ".to_string(),
            "seafood".to_string(),
            "".to_string(),
            "Night Life".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["seafood", "night life"]);
    }

    #[test]
    fn test_listing_origin_rules() {
        assert_ok!(check_listing_origin(None, None, None));
        assert_ok!(check_listing_origin(Some(12.24), Some(109.19), Some(2.0)));
        assert_err!(check_listing_origin(None, None, Some(2.0)));
        assert_err!(check_listing_origin(Some(12.24), Some(109.19), Some(0.0)));
        assert_err!(check_listing_origin(Some(12.24), None, None));
        assert_err!(check_listing_origin(Some(95.0), Some(109.19), None));
    }

    #[test]
    fn test_import_report_shape() {
        let report = ImportReport {
            received: 2,
            created: vec![ImportedPlace {
                index: 0,
                id: Uuid::nil(),
                slug: "cho-dam".to_string(),
            }],
            failed: vec![ImportFailure {
                index: 1,
                name: None,
                error: "Invalid row: missing field `name`".to_string(),
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["received"], 2);
        assert_eq!(json["created"][0]["slug"], "cho-dam");
        assert_eq!(json["failed"][0]["index"], 1);
    }
}
