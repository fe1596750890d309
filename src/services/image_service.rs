// src/services/image_service.rs
// DOCUMENTATION: Image set management for places and accommodations
// PURPOSE: Owner checks and ordering rules on top of ImageRepository

use crate::db::{AccommodationRepository, ImageRepository, PlaceRepository};
use crate::errors::GuideError;
use crate::models::{AddImageRequest, ImageOwner, ImageResponse};
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

/// A reorder request must list every image of the set exactly once
pub fn check_permutation(current: &[Uuid], requested: &[Uuid]) -> Result<(), GuideError> {
    let requested_set: HashSet<&Uuid> = requested.iter().collect();
    if requested_set.len() != requested.len() {
        return Err(GuideError::ValidationError(
            "image_ids contains duplicates".to_string(),
        ));
    }

    let current_set: HashSet<&Uuid> = current.iter().collect();
    if requested_set != current_set {
        return Err(GuideError::ValidationError(format!(
            "image_ids must list all {} images of the set exactly once",
            current.len()
        )));
    }
    Ok(())
}

pub struct ImageService;

impl ImageService {
    async fn ensure_owner(pool: &PgPool, owner: ImageOwner, owner_id: Uuid) -> Result<(), GuideError> {
        match owner {
            ImageOwner::Place => PlaceRepository::get_by_id(pool, owner_id).await.map(|_| ()),
            ImageOwner::Accommodation => AccommodationRepository::get_by_id(pool, owner_id)
                .await
                .map(|_| ()),
        }
    }

    pub async fn list_images(
        pool: &PgPool,
        owner: ImageOwner,
        owner_id: Uuid,
    ) -> Result<Vec<ImageResponse>, GuideError> {
        let images = ImageRepository::list(pool, owner, owner_id).await?;
        Ok(images.iter().map(|i| i.to_response()).collect())
    }

    pub async fn add_image(
        pool: &PgPool,
        owner: ImageOwner,
        owner_id: Uuid,
        req: AddImageRequest,
    ) -> Result<ImageResponse, GuideError> {
        req.validate()?;
        if matches!(req.sort_order, Some(n) if n < 0) {
            return Err(GuideError::ValidationError(
                "sort_order must not be negative".to_string(),
            ));
        }
        Self::ensure_owner(pool, owner, owner_id).await?;

        let image = ImageRepository::add(pool, owner, owner_id, &req).await?;
        Ok(image.to_response())
    }

    pub async fn set_thumbnail(
        pool: &PgPool,
        owner: ImageOwner,
        owner_id: Uuid,
        image_id: Uuid,
    ) -> Result<Vec<ImageResponse>, GuideError> {
        Self::ensure_owner(pool, owner, owner_id).await?;
        ImageRepository::set_thumbnail(pool, owner, owner_id, image_id).await?;
        Self::list_images(pool, owner, owner_id).await
    }

    /// Returns the set in its new order
    pub async fn reorder(
        pool: &PgPool,
        owner: ImageOwner,
        owner_id: Uuid,
        image_ids: Vec<Uuid>,
    ) -> Result<Vec<ImageResponse>, GuideError> {
        Self::ensure_owner(pool, owner, owner_id).await?;

        let current: Vec<Uuid> = ImageRepository::list(pool, owner, owner_id)
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect();
        check_permutation(&current, &image_ids)?;

        ImageRepository::reorder(pool, owner, owner_id, &image_ids).await?;
        Self::list_images(pool, owner, owner_id).await
    }

    pub async fn delete_image(
        pool: &PgPool,
        owner: ImageOwner,
        owner_id: Uuid,
        image_id: Uuid,
    ) -> Result<(), GuideError> {
        ImageRepository::delete(pool, owner, owner_id, image_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_permutation_accepts_any_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert_ok!(check_permutation(&[a, b, c], &[c, a, b]));
        assert_ok!(check_permutation(&[], &[]));
    }

    #[test]
    fn test_permutation_rejects_missing_extra_and_duplicates() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_err!(check_permutation(&[a, b], &[a]));
        assert_err!(check_permutation(&[a], &[a, b]));
        assert_err!(check_permutation(&[a, b], &[a, a]));
        assert_err!(check_permutation(&[a, b], &[a, b, b]));
    }
}
