// src/db/itinerary_repository.rs
// DOCUMENTATION: Persistence of itineraries with their days and items
// PURPOSE: Writes of a whole itinerary happen inside one transaction

use crate::errors::GuideError;
use crate::models::*;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct ItineraryRepository;

/// Header fields written on create and replace
pub struct ItineraryHeader<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub is_public: bool,
}

impl ItineraryRepository {
    async fn insert_days(
        tx: &mut Transaction<'_, Postgres>,
        itinerary_id: Uuid,
        days: &[NormalizedDay],
    ) -> Result<(), GuideError> {
        for day in days {
            let day_id = Uuid::new_v4();
            sqlx::query(
                r#"
                INSERT INTO itinerary_days (id, itinerary_id, day_number, date, notes)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(day_id)
            .bind(itinerary_id)
            .bind(day.day_number)
            .bind(day.date)
            .bind(&day.notes)
            .execute(&mut **tx)
            .await
            .map_err(|e| GuideError::from_db("Failed to insert itinerary day", e))?;

            for item in &day.items {
                sqlx::query(
                    r#"
                    INSERT INTO itinerary_items (
                        id, day_id, place_id, accommodation_id,
                        start_time, end_time, travel_mode, notes, sort_order
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(day_id)
                .bind(item.stop.place_id())
                .bind(item.stop.accommodation_id())
                .bind(item.start_time)
                .bind(item.end_time)
                .bind(item.travel_mode.map(|m| m.as_str()))
                .bind(&item.notes)
                .bind(item.sort_order)
                .execute(&mut **tx)
                .await
                .map_err(|e| GuideError::from_db("Failed to insert itinerary item", e))?;
            }
        }
        Ok(())
    }

    pub async fn create(
        pool: &PgPool,
        header: &ItineraryHeader<'_>,
        days: &[NormalizedDay],
        share_token: &str,
        edit_token: &str,
    ) -> Result<Itinerary, GuideError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| GuideError::from_db("Failed to begin transaction", e))?;

        let itinerary = sqlx::query_as::<_, Itinerary>(
            r#"
            INSERT INTO itineraries (
                id, title, description, start_date, end_date,
                share_token, edit_token, is_public
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(header.title)
        .bind(header.description)
        .bind(header.start_date)
        .bind(header.end_date)
        .bind(share_token)
        .bind(edit_token)
        .bind(header.is_public)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| GuideError::from_db("Failed to create itinerary", e))?;

        Self::insert_days(&mut tx, itinerary.id, days).await?;

        tx.commit()
            .await
            .map_err(|e| GuideError::from_db("Failed to commit itinerary", e))?;

        log::info!(
            "Created itinerary {} with {} days",
            itinerary.id,
            days.len()
        );
        Ok(itinerary)
    }

    /// Replace the header and every day/item of an itinerary
    pub async fn replace(
        pool: &PgPool,
        id: Uuid,
        header: &ItineraryHeader<'_>,
        days: &[NormalizedDay],
    ) -> Result<Itinerary, GuideError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| GuideError::from_db("Failed to begin transaction", e))?;

        let itinerary = sqlx::query_as::<_, Itinerary>(
            r#"
            UPDATE itineraries
            SET title = $1, description = $2, start_date = $3, end_date = $4,
                is_public = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(header.title)
        .bind(header.description)
        .bind(header.start_date)
        .bind(header.end_date)
        .bind(header.is_public)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| GuideError::from_db("Failed to update itinerary", e))?
        .ok_or_else(|| GuideError::NotFound(format!("itinerary {}", id)))?;

        // Items go with their days (ON DELETE CASCADE)
        sqlx::query("DELETE FROM itinerary_days WHERE itinerary_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| GuideError::from_db("Failed to clear itinerary days", e))?;

        Self::insert_days(&mut tx, id, days).await?;

        tx.commit()
            .await
            .map_err(|e| GuideError::from_db("Failed to commit itinerary", e))?;

        log::info!("Replaced itinerary {} ({} days)", id, days.len());
        Ok(itinerary)
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Itinerary, GuideError> {
        sqlx::query_as::<_, Itinerary>("SELECT * FROM itineraries WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| GuideError::from_db("Database error fetching itinerary", e))?
            .ok_or_else(|| GuideError::NotFound(format!("itinerary {}", id)))
    }

    pub async fn get_by_share_token(pool: &PgPool, token: &str) -> Result<Itinerary, GuideError> {
        sqlx::query_as::<_, Itinerary>(
            "SELECT * FROM itineraries WHERE share_token = $1 AND is_public = true",
        )
        .bind(token)
        .fetch_optional(pool)
        .await
        .map_err(|e| GuideError::from_db("Database error fetching shared itinerary", e))?
        .ok_or_else(|| GuideError::NotFound("shared itinerary".to_string()))
    }

    pub async fn days(pool: &PgPool, itinerary_id: Uuid) -> Result<Vec<ItineraryDay>, GuideError> {
        sqlx::query_as::<_, ItineraryDay>(
            "SELECT * FROM itinerary_days WHERE itinerary_id = $1 ORDER BY day_number ASC",
        )
        .bind(itinerary_id)
        .fetch_all(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to fetch itinerary days", e))
    }

    /// Items of every day, joined with the name, category and coordinates
    /// of the place or accommodation they reference
    pub async fn items(pool: &PgPool, itinerary_id: Uuid) -> Result<Vec<ItineraryItemRow>, GuideError> {
        sqlx::query_as::<_, ItineraryItemRow>(
            r#"
            SELECT i.id, i.day_id, i.place_id, i.accommodation_id,
                   i.start_time, i.end_time, i.travel_mode, i.notes, i.sort_order,
                   COALESCE(p.name, a.name) AS stop_name,
                   COALESCE(p.category, a.accommodation_type) AS stop_category,
                   COALESCE(p.latitude, a.latitude) AS latitude,
                   COALESCE(p.longitude, a.longitude) AS longitude
            FROM itinerary_items i
            JOIN itinerary_days d ON d.id = i.day_id
            LEFT JOIN places p ON p.id = i.place_id
            LEFT JOIN accommodations a ON a.id = i.accommodation_id
            WHERE d.itinerary_id = $1
            ORDER BY d.day_number ASC, i.sort_order ASC
            "#,
        )
        .bind(itinerary_id)
        .fetch_all(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to fetch itinerary items", e))
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), GuideError> {
        let rows = sqlx::query("DELETE FROM itineraries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| GuideError::from_db(&format!("Delete failed for itinerary {}", id), e))?
            .rows_affected();

        if rows == 0 {
            return Err(GuideError::NotFound(format!("itinerary {}", id)));
        }

        log::info!("Deleted itinerary: {}", id);
        Ok(())
    }

    /// (total, public) itinerary counts
    pub async fn counts(pool: &PgPool) -> Result<(i64, i64), GuideError> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_public) FROM itineraries",
        )
        .fetch_one(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to count itineraries", e))
    }
}
