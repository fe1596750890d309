// src/db/place_repository.rs
// DOCUMENTATION: Database access layer for places
// PURPOSE: All SQL touching the places table

use crate::db::filters::{like_pattern, origin, push_distance_km, thumbnail_join};
use crate::errors::GuideError;
use crate::models::*;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const PLACE_COLUMNS: &str = r#"
    p.id, p.name, p.slug, p.category, p.description, p.address, p.district,
    p.latitude, p.longitude, p.rating, p.review_count, p.price_level,
    p.opening_hours, p.phone, p.website, p.tags, p.cuisine_types,
    p.is_featured, p.is_active, p.created_at, p.updated_at,
    thumb.url AS thumbnail_url
"#;

/// PlaceRepository: All database operations for places
pub struct PlaceRepository;

impl PlaceRepository {
    fn select_one(condition: &str) -> String {
        format!(
            "SELECT {} FROM places p {} WHERE {} AND p.is_active = true",
            PLACE_COLUMNS,
            thumbnail_join("place", "p"),
            condition
        )
    }

    /// Insert a place; the slug must already be unique
    pub async fn create_place(
        pool: &PgPool,
        slug: &str,
        req: &CreatePlaceRequest,
    ) -> Result<Place, GuideError> {
        let place = sqlx::query_as::<_, Place>(
            r#"
            INSERT INTO places (
                id, name, slug, category, description, address, district,
                latitude, longitude, rating, review_count, price_level,
                opening_hours, phone, website, tags, cuisine_types, is_featured
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(slug)
        .bind(req.category.as_str())
        .bind(&req.description)
        .bind(&req.address)
        .bind(&req.district)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.rating)
        .bind(req.review_count)
        .bind(req.price_level)
        .bind(&req.opening_hours)
        .bind(&req.phone)
        .bind(&req.website)
        .bind(&req.tags)
        .bind(&req.cuisine_types)
        .bind(req.is_featured)
        .fetch_one(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to create place", e))?;

        log::info!("Created place {} ({})", place.id, place.slug);
        Ok(place)
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Place, GuideError> {
        sqlx::query_as::<_, Place>(&Self::select_one("p.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| GuideError::from_db("Database error fetching place", e))?
            .ok_or_else(|| {
                log::warn!("Place not found: {}", id);
                GuideError::NotFound(format!("place {}", id))
            })
    }

    pub async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<Place, GuideError> {
        sqlx::query_as::<_, Place>(&Self::select_one("p.slug = $1"))
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(|e| GuideError::from_db("Database error fetching place by slug", e))?
            .ok_or_else(|| {
                log::warn!("Place not found with slug: {}", slug);
                GuideError::NotFound(format!("place '{}'", slug))
            })
    }

    /// Slugs already taken by `base` or `base-N`
    pub async fn slugs_like(pool: &PgPool, base: &str) -> Result<Vec<String>, GuideError> {
        sqlx::query_scalar::<_, String>(
            "SELECT slug FROM places WHERE slug = $1 OR slug LIKE $2",
        )
        .bind(base)
        .bind(format!("{}-%", base))
        .fetch_all(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to look up slugs", e))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &PlaceQuery) {
        qb.push(" WHERE p.is_active = true");

        if let Some(category) = query.category {
            qb.push(" AND p.category = ").push_bind(category.as_str());
        }

        if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
            let pattern = like_pattern(q);
            qb.push(" AND (p.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(district) = query.district.as_deref().filter(|d| !d.trim().is_empty()) {
            qb.push(" AND p.district ILIKE ").push_bind(like_pattern(district));
        }

        if let Some(min_rating) = query.min_rating {
            qb.push(" AND p.rating >= ").push_bind(min_rating);
        }

        if let Some(min_price) = query.min_price_level {
            qb.push(" AND p.price_level >= ").push_bind(min_price);
        }

        if let Some(max_price) = query.max_price_level {
            qb.push(" AND p.price_level <= ").push_bind(max_price);
        }

        if let Some(tag) = query.tag.as_deref().filter(|t| !t.trim().is_empty()) {
            qb.push(" AND ")
                .push_bind(tag.trim().to_lowercase())
                .push(" = ANY(p.tags)");
        }

        if let Some(featured) = query.featured {
            qb.push(" AND p.is_featured = ").push_bind(featured);
        }

        if let (Some((lat, lng)), Some(radius_km)) = (origin(query.lat, query.lng), query.radius_km) {
            qb.push(" AND p.latitude IS NOT NULL AND ");
            push_distance_km(qb, "p", lat, lng);
            qb.push(" <= ").push_bind(radius_km);
        }
    }

    /// Filtered, sorted, paginated listing
    /// Returns tuple: (results, total_count) for pagination
    pub async fn search(pool: &PgPool, query: &PlaceQuery) -> Result<(Vec<Place>, i64), GuideError> {
        let (page, limit) = page_and_limit(query.page, query.limit);
        let offset = (page - 1) * limit;
        let origin = origin(query.lat, query.lng);

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM places p");
        Self::push_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(|e| GuideError::from_db("Count query error", e))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(PLACE_COLUMNS);
        if let Some((lat, lng)) = origin {
            qb.push(", ");
            push_distance_km(&mut qb, "p", lat, lng);
            qb.push(" AS distance_km");
        }
        qb.push(" FROM places p ");
        qb.push(thumbnail_join("place", "p"));
        Self::push_filters(&mut qb, query);

        let order = match (query.sort.unwrap_or_default(), origin) {
            (ListingSort::Distance, Some(_)) => "distance_km ASC NULLS LAST, p.name ASC",
            (ListingSort::Name, _) => "p.name ASC",
            (ListingSort::Newest, _) => "p.created_at DESC",
            (ListingSort::Price, _) => "p.price_level ASC NULLS LAST, p.rating DESC NULLS LAST",
            _ => "p.is_featured DESC, p.rating DESC NULLS LAST, p.review_count DESC, p.name ASC",
        };
        qb.push(" ORDER BY ").push(order);
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        log::debug!("Executing place search: {}", qb.sql());

        let places = qb
            .build_query_as::<Place>()
            .fetch_all(pool)
            .await
            .map_err(|e| GuideError::from_db("Place search query error", e))?;

        log::info!(
            "Place search completed: {} results, {} total (page {})",
            places.len(),
            total,
            page
        );

        Ok((places, total))
    }

    /// Partial update - only provided fields are modified
    pub async fn update_place(
        pool: &PgPool,
        id: Uuid,
        req: &UpdatePlaceRequest,
    ) -> Result<Place, GuideError> {
        let updated = sqlx::query_as::<_, Place>(
            r#"
            UPDATE places
            SET name = COALESCE($1, name),
                category = COALESCE($2, category),
                description = COALESCE($3, description),
                address = COALESCE($4, address),
                district = COALESCE($5, district),
                latitude = COALESCE($6, latitude),
                longitude = COALESCE($7, longitude),
                rating = COALESCE($8, rating),
                review_count = COALESCE($9, review_count),
                price_level = COALESCE($10, price_level),
                opening_hours = COALESCE($11, opening_hours),
                phone = COALESCE($12, phone),
                website = COALESCE($13, website),
                tags = COALESCE($14, tags),
                cuisine_types = COALESCE($15, cuisine_types),
                is_featured = COALESCE($16, is_featured),
                updated_at = NOW()
            WHERE id = $17 AND is_active = true
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(req.category.map(|c| c.as_str()))
        .bind(&req.description)
        .bind(&req.address)
        .bind(&req.district)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.rating)
        .bind(req.review_count)
        .bind(req.price_level)
        .bind(&req.opening_hours)
        .bind(&req.phone)
        .bind(&req.website)
        .bind(&req.tags)
        .bind(&req.cuisine_types)
        .bind(req.is_featured)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| GuideError::from_db(&format!("Update failed for place {}", id), e))?
        .ok_or_else(|| GuideError::NotFound(format!("place {}", id)))?;

        log::info!("Updated place: {}", id);
        Ok(updated)
    }

    /// Soft delete: sets is_active=false instead of physical deletion
    pub async fn delete_place(pool: &PgPool, id: Uuid) -> Result<(), GuideError> {
        let rows = sqlx::query(
            "UPDATE places SET is_active = false, updated_at = NOW() WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| GuideError::from_db(&format!("Delete failed for place {}", id), e))?
        .rows_affected();

        if rows == 0 {
            return Err(GuideError::NotFound(format!("place {}", id)));
        }

        log::info!("Deleted place: {}", id);
        Ok(())
    }

    /// Active ids among `ids`
    pub async fn existing_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Uuid>, GuideError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM places WHERE id = ANY($1) AND is_active = true")
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(|e| GuideError::from_db("Failed to check place ids", e))
    }
}
