// src/db/image_repository.rs
// DOCUMENTATION: Image set operations for places and accommodations
// PURPOSE: Keep one thumbnail per set and a dense display order

use crate::errors::GuideError;
use crate::models::{plan_thumbnail, thumbnail_successor, AddImageRequest, ImageOwner, PlaceImage};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct ImageRepository;

impl ImageRepository {
    /// Image set in display order
    pub async fn list(
        pool: &PgPool,
        owner: ImageOwner,
        owner_id: Uuid,
    ) -> Result<Vec<PlaceImage>, GuideError> {
        sqlx::query_as::<_, PlaceImage>(
            r#"
            SELECT * FROM place_images
            WHERE owner_kind = $1 AND owner_id = $2
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(owner.as_str())
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to fetch images", e))
    }

    async fn clear_thumbnail(
        tx: &mut Transaction<'_, Postgres>,
        owner: ImageOwner,
        owner_id: Uuid,
    ) -> Result<(), GuideError> {
        sqlx::query(
            "UPDATE place_images SET is_thumbnail = false WHERE owner_kind = $1 AND owner_id = $2 AND is_thumbnail",
        )
        .bind(owner.as_str())
        .bind(owner_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| GuideError::from_db("Failed to clear thumbnail", e))?;
        Ok(())
    }

    /// Add an image; the first image of a set always becomes its thumbnail
    pub async fn add(
        pool: &PgPool,
        owner: ImageOwner,
        owner_id: Uuid,
        req: &AddImageRequest,
    ) -> Result<PlaceImage, GuideError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| GuideError::from_db("Failed to begin transaction", e))?;

        let (count, next_order): (i64, i32) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(MAX(sort_order) + 1, 0)
            FROM place_images
            WHERE owner_kind = $1 AND owner_id = $2
            "#,
        )
        .bind(owner.as_str())
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| GuideError::from_db("Failed to inspect image set", e))?;

        let plan = plan_thumbnail(req.is_thumbnail, count);
        if plan.clear_existing {
            Self::clear_thumbnail(&mut tx, owner, owner_id).await?;
        }
        let is_thumbnail = plan.is_thumbnail;

        let image = sqlx::query_as::<_, PlaceImage>(
            r#"
            INSERT INTO place_images (id, owner_kind, owner_id, url, alt_text, is_thumbnail, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner.as_str())
        .bind(owner_id)
        .bind(&req.url)
        .bind(&req.alt_text)
        .bind(is_thumbnail)
        .bind(req.sort_order.unwrap_or(next_order))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| GuideError::from_db("Failed to add image", e))?;

        tx.commit()
            .await
            .map_err(|e| GuideError::from_db("Failed to commit image", e))?;

        log::info!(
            "Added image {} to {} {} (thumbnail: {})",
            image.id,
            owner.as_str(),
            owner_id,
            is_thumbnail
        );
        Ok(image)
    }

    pub async fn set_thumbnail(
        pool: &PgPool,
        owner: ImageOwner,
        owner_id: Uuid,
        image_id: Uuid,
    ) -> Result<(), GuideError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| GuideError::from_db("Failed to begin transaction", e))?;

        Self::clear_thumbnail(&mut tx, owner, owner_id).await?;

        let rows = sqlx::query(
            "UPDATE place_images SET is_thumbnail = true WHERE id = $1 AND owner_kind = $2 AND owner_id = $3",
        )
        .bind(image_id)
        .bind(owner.as_str())
        .bind(owner_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| GuideError::from_db("Failed to set thumbnail", e))?
        .rows_affected();

        if rows == 0 {
            // Dropping the transaction rolls back the cleared thumbnail
            return Err(GuideError::NotFound(format!("image {}", image_id)));
        }

        tx.commit()
            .await
            .map_err(|e| GuideError::from_db("Failed to commit thumbnail", e))?;

        log::info!("Image {} is now the thumbnail of {} {}", image_id, owner.as_str(), owner_id);
        Ok(())
    }

    /// Rewrite sort_order from the position of each id in `ordered_ids`
    pub async fn reorder(
        pool: &PgPool,
        owner: ImageOwner,
        owner_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<(), GuideError> {
        sqlx::query(
            r#"
            UPDATE place_images AS pi
            SET sort_order = (o.ord - 1)::int
            FROM UNNEST($1::uuid[]) WITH ORDINALITY AS o(id, ord)
            WHERE pi.id = o.id AND pi.owner_kind = $2 AND pi.owner_id = $3
            "#,
        )
        .bind(ordered_ids)
        .bind(owner.as_str())
        .bind(owner_id)
        .execute(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to reorder images", e))?;

        log::info!(
            "Reordered {} images of {} {}",
            ordered_ids.len(),
            owner.as_str(),
            owner_id
        );
        Ok(())
    }

    /// Delete an image; if it was the thumbnail, the next image in order takes over
    pub async fn delete(
        pool: &PgPool,
        owner: ImageOwner,
        owner_id: Uuid,
        image_id: Uuid,
    ) -> Result<(), GuideError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| GuideError::from_db("Failed to begin transaction", e))?;

        let was_thumbnail: bool = sqlx::query_scalar(
            "DELETE FROM place_images WHERE id = $1 AND owner_kind = $2 AND owner_id = $3 RETURNING is_thumbnail",
        )
        .bind(image_id)
        .bind(owner.as_str())
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| GuideError::from_db("Failed to delete image", e))?
        .ok_or_else(|| GuideError::NotFound(format!("image {}", image_id)))?;

        if was_thumbnail {
            let remaining = sqlx::query_as::<_, PlaceImage>(
                "SELECT * FROM place_images WHERE owner_kind = $1 AND owner_id = $2",
            )
            .bind(owner.as_str())
            .bind(owner_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| GuideError::from_db("Failed to load remaining images", e))?;

            if let Some(successor) = thumbnail_successor(&remaining) {
                sqlx::query("UPDATE place_images SET is_thumbnail = true WHERE id = $1")
                    .bind(successor)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| GuideError::from_db("Failed to promote thumbnail", e))?;
                log::info!(
                    "Image {} is now the thumbnail of {} {}",
                    successor,
                    owner.as_str(),
                    owner_id
                );
            }
        }

        tx.commit()
            .await
            .map_err(|e| GuideError::from_db("Failed to commit image delete", e))?;

        log::info!("Deleted image {} of {} {}", image_id, owner.as_str(), owner_id);
        Ok(())
    }

    /// Images per owner kind, for the admin dashboard
    pub async fn count_by_owner(pool: &PgPool) -> Result<Vec<(String, i64)>, GuideError> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT owner_kind, COUNT(*) FROM place_images GROUP BY owner_kind ORDER BY owner_kind",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to count images", e))
    }
}
