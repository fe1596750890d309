// src/db/stats_repository.rs
// DOCUMENTATION: Aggregate queries behind GET /admin/stats

use crate::db::{ImageRepository, ItineraryRepository};
use crate::errors::GuideError;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct GroupCount {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct CatalogStats {
    pub places_by_category: Vec<GroupCount>,
    pub accommodations_by_type: Vec<GroupCount>,
    pub average_place_rating: Option<f64>,
    pub average_accommodation_rating: Option<f64>,
    pub images_by_owner: Vec<GroupCount>,
    pub itineraries: i64,
    pub public_itineraries: i64,
}

pub struct StatsRepository;

impl StatsRepository {
    pub async fn catalog_stats(pool: &PgPool) -> Result<CatalogStats, GuideError> {
        let places_by_category: Vec<GroupCount> = sqlx::query_as(
            r#"
            SELECT category AS key, COUNT(*) AS count
            FROM places WHERE is_active = true
            GROUP BY category ORDER BY count DESC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to count places", e))?;

        let accommodations_by_type: Vec<GroupCount> = sqlx::query_as(
            r#"
            SELECT accommodation_type AS key, COUNT(*) AS count
            FROM accommodations WHERE is_active = true
            GROUP BY accommodation_type ORDER BY count DESC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to count accommodations", e))?;

        // AVG over REAL yields DOUBLE PRECISION
        let (average_place_rating, average_accommodation_rating): (Option<f64>, Option<f64>) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT AVG(rating) FROM places WHERE is_active = true AND rating IS NOT NULL),
                    (SELECT AVG(rating) FROM accommodations WHERE is_active = true AND rating IS NOT NULL)
                "#,
            )
            .fetch_one(pool)
            .await
            .map_err(|e| GuideError::from_db("Failed to average ratings", e))?;

        let images_by_owner = ImageRepository::count_by_owner(pool)
            .await?
            .into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect();

        let (itineraries, public_itineraries) = ItineraryRepository::counts(pool).await?;

        Ok(CatalogStats {
            places_by_category,
            accommodations_by_type,
            average_place_rating,
            average_accommodation_rating,
            images_by_owner,
            itineraries,
            public_itineraries,
        })
    }
}
