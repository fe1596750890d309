// src/services/accommodation_service.rs
// DOCUMENTATION: Business logic for accommodations

use crate::db::{AccommodationRepository, ImageRepository};
use crate::errors::GuideError;
use crate::models::{
    check_price_range, page_and_limit, point_from, AccommodationDetailResponse,
    AccommodationQuery, AccommodationResponse, CreateAccommodationRequest, ImageOwner, Page,
    UpdateAccommodationRequest,
};
use crate::services::place_service::{check_listing_origin, normalize_tags};
use crate::services::slug::{next_free_slug, slugify};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct AccommodationService;

impl AccommodationService {
    pub async fn create_accommodation(
        pool: &PgPool,
        mut req: CreateAccommodationRequest,
    ) -> Result<AccommodationResponse, GuideError> {
        req.validate()?;
        point_from(req.latitude, req.longitude)?;
        check_price_range(req.price_min, req.price_max)?;

        let base = slugify(req.slug.as_deref().unwrap_or(&req.name));
        if base.is_empty() {
            return Err(GuideError::ValidationError(format!(
                "can not derive a slug from '{}'",
                req.name
            )));
        }
        let taken = AccommodationRepository::slugs_like(pool, &base).await?;
        let slug = next_free_slug(&base, &taken);

        req.amenities = normalize_tags(&req.amenities);

        let accommodation = AccommodationRepository::create_accommodation(pool, &slug, &req).await?;
        Ok(accommodation.to_response())
    }

    pub async fn get_accommodation(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<AccommodationDetailResponse, GuideError> {
        let accommodation = match Uuid::parse_str(identifier) {
            Ok(id) => AccommodationRepository::get_by_id(pool, id).await?,
            Err(_) => AccommodationRepository::get_by_slug(pool, identifier).await?,
        };
        let images = ImageRepository::list(pool, ImageOwner::Accommodation, accommodation.id).await?;

        Ok(AccommodationDetailResponse {
            accommodation: accommodation.to_response(),
            images: images.iter().map(|i| i.to_response()).collect(),
        })
    }

    pub async fn search_accommodations(
        pool: &PgPool,
        query: AccommodationQuery,
    ) -> Result<Page<AccommodationResponse>, GuideError> {
        check_listing_origin(query.lat, query.lng, query.radius_km)?;
        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(GuideError::InvalidInput(
                    "min_price must not exceed max_price".to_string(),
                ));
            }
        }

        let (rows, total) = AccommodationRepository::search(pool, &query).await?;
        let (page, limit) = page_and_limit(query.page, query.limit);

        Ok(Page::new(
            rows.iter().map(|a| a.to_response()).collect(),
            total,
            page,
            limit,
        ))
    }

    pub async fn update_accommodation(
        pool: &PgPool,
        id: Uuid,
        mut req: UpdateAccommodationRequest,
    ) -> Result<AccommodationResponse, GuideError> {
        req.validate()?;
        point_from(req.latitude, req.longitude)?;

        // A one-sided price change is checked against the stored bound
        let current = AccommodationRepository::get_by_id(pool, id).await?;
        check_price_range(
            req.price_min.or(current.price_min),
            req.price_max.or(current.price_max),
        )?;
        req.amenities = req.amenities.map(|a| normalize_tags(&a));

        AccommodationRepository::update_accommodation(pool, id, &req).await?;
        let accommodation = AccommodationRepository::get_by_id(pool, id).await?;
        Ok(accommodation.to_response())
    }

    pub async fn delete_accommodation(pool: &PgPool, id: Uuid) -> Result<(), GuideError> {
        AccommodationRepository::delete_accommodation(pool, id).await
    }
}
