// src/db/accommodation_repository.rs
// DOCUMENTATION: Database access layer for accommodations

use crate::db::filters::{like_pattern, origin, push_distance_km, thumbnail_join};
use crate::errors::GuideError;
use crate::models::*;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const ACCOMMODATION_COLUMNS: &str = r#"
    a.id, a.name, a.slug, a.accommodation_type, a.description, a.address, a.district,
    a.latitude, a.longitude, a.star_rating, a.rating, a.review_count,
    a.price_min, a.price_max, a.amenities, a.beach_distance_m,
    a.phone, a.website, a.booking_url, a.is_featured, a.is_active,
    a.created_at, a.updated_at,
    thumb.url AS thumbnail_url
"#;

pub struct AccommodationRepository;

impl AccommodationRepository {
    fn select_one(condition: &str) -> String {
        format!(
            "SELECT {} FROM accommodations a {} WHERE {} AND a.is_active = true",
            ACCOMMODATION_COLUMNS,
            thumbnail_join("accommodation", "a"),
            condition
        )
    }

    pub async fn create_accommodation(
        pool: &PgPool,
        slug: &str,
        req: &CreateAccommodationRequest,
    ) -> Result<Accommodation, GuideError> {
        let accommodation = sqlx::query_as::<_, Accommodation>(
            r#"
            INSERT INTO accommodations (
                id, name, slug, accommodation_type, description, address, district,
                latitude, longitude, star_rating, rating, review_count,
                price_min, price_max, amenities, beach_distance_m,
                phone, website, booking_url, is_featured
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(slug)
        .bind(req.accommodation_type.as_str())
        .bind(&req.description)
        .bind(&req.address)
        .bind(&req.district)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.star_rating)
        .bind(req.rating)
        .bind(req.review_count)
        .bind(req.price_min)
        .bind(req.price_max)
        .bind(&req.amenities)
        .bind(req.beach_distance_m)
        .bind(&req.phone)
        .bind(&req.website)
        .bind(&req.booking_url)
        .bind(req.is_featured)
        .fetch_one(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to create accommodation", e))?;

        log::info!(
            "Created accommodation {} ({})",
            accommodation.id,
            accommodation.slug
        );
        Ok(accommodation)
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Accommodation, GuideError> {
        sqlx::query_as::<_, Accommodation>(&Self::select_one("a.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| GuideError::from_db("Database error fetching accommodation", e))?
            .ok_or_else(|| GuideError::NotFound(format!("accommodation {}", id)))
    }

    pub async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<Accommodation, GuideError> {
        sqlx::query_as::<_, Accommodation>(&Self::select_one("a.slug = $1"))
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(|e| GuideError::from_db("Database error fetching accommodation by slug", e))?
            .ok_or_else(|| GuideError::NotFound(format!("accommodation '{}'", slug)))
    }

    pub async fn slugs_like(pool: &PgPool, base: &str) -> Result<Vec<String>, GuideError> {
        sqlx::query_scalar::<_, String>(
            "SELECT slug FROM accommodations WHERE slug = $1 OR slug LIKE $2",
        )
        .bind(base)
        .bind(format!("{}-%", base))
        .fetch_all(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to look up slugs", e))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &AccommodationQuery) {
        qb.push(" WHERE a.is_active = true");

        if let Some(kind) = query.accommodation_type {
            qb.push(" AND a.accommodation_type = ").push_bind(kind.as_str());
        }

        if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
            let pattern = like_pattern(q);
            qb.push(" AND (a.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR a.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(district) = query.district.as_deref().filter(|d| !d.trim().is_empty()) {
            qb.push(" AND a.district ILIKE ").push_bind(like_pattern(district));
        }

        if let Some(min_rating) = query.min_rating {
            qb.push(" AND a.rating >= ").push_bind(min_rating);
        }

        if let Some(min_stars) = query.min_stars {
            qb.push(" AND a.star_rating >= ").push_bind(min_stars);
        }

        // Ranges overlap: cheapest room within budget, priciest above the floor
        if let Some(max_price) = query.max_price {
            qb.push(" AND a.price_min <= ").push_bind(max_price);
        }

        if let Some(min_price) = query.min_price {
            qb.push(" AND COALESCE(a.price_max, a.price_min) >= ").push_bind(min_price);
        }

        let amenities = query.amenity_list();
        if !amenities.is_empty() {
            qb.push(" AND a.amenities @> ").push_bind(amenities);
        }

        if let Some(max_beach) = query.max_beach_distance_m {
            qb.push(" AND a.beach_distance_m <= ").push_bind(max_beach);
        }

        if let Some(featured) = query.featured {
            qb.push(" AND a.is_featured = ").push_bind(featured);
        }

        if let (Some((lat, lng)), Some(radius_km)) = (origin(query.lat, query.lng), query.radius_km) {
            qb.push(" AND a.latitude IS NOT NULL AND ");
            push_distance_km(qb, "a", lat, lng);
            qb.push(" <= ").push_bind(radius_km);
        }
    }

    pub async fn search(
        pool: &PgPool,
        query: &AccommodationQuery,
    ) -> Result<(Vec<Accommodation>, i64), GuideError> {
        let (page, limit) = page_and_limit(query.page, query.limit);
        let offset = (page - 1) * limit;
        let origin = origin(query.lat, query.lng);

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM accommodations a");
        Self::push_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(|e| GuideError::from_db("Count query error", e))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(ACCOMMODATION_COLUMNS);
        if let Some((lat, lng)) = origin {
            qb.push(", ");
            push_distance_km(&mut qb, "a", lat, lng);
            qb.push(" AS distance_km");
        }
        qb.push(" FROM accommodations a ");
        qb.push(thumbnail_join("accommodation", "a"));
        Self::push_filters(&mut qb, query);

        let order = match (query.sort.unwrap_or_default(), origin) {
            (ListingSort::Distance, Some(_)) => "distance_km ASC NULLS LAST, a.name ASC",
            (ListingSort::Name, _) => "a.name ASC",
            (ListingSort::Newest, _) => "a.created_at DESC",
            (ListingSort::Price, _) => "a.price_min ASC NULLS LAST, a.rating DESC NULLS LAST",
            _ => "a.is_featured DESC, a.rating DESC NULLS LAST, a.review_count DESC, a.name ASC",
        };
        qb.push(" ORDER BY ").push(order);
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        log::debug!("Executing accommodation search: {}", qb.sql());

        let rows = qb
            .build_query_as::<Accommodation>()
            .fetch_all(pool)
            .await
            .map_err(|e| GuideError::from_db("Accommodation search query error", e))?;

        log::info!(
            "Accommodation search completed: {} results, {} total (page {})",
            rows.len(),
            total,
            page
        );

        Ok((rows, total))
    }

    pub async fn update_accommodation(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateAccommodationRequest,
    ) -> Result<Accommodation, GuideError> {
        let updated = sqlx::query_as::<_, Accommodation>(
            r#"
            UPDATE accommodations
            SET name = COALESCE($1, name),
                accommodation_type = COALESCE($2, accommodation_type),
                description = COALESCE($3, description),
                address = COALESCE($4, address),
                district = COALESCE($5, district),
                latitude = COALESCE($6, latitude),
                longitude = COALESCE($7, longitude),
                star_rating = COALESCE($8, star_rating),
                rating = COALESCE($9, rating),
                review_count = COALESCE($10, review_count),
                price_min = COALESCE($11, price_min),
                price_max = COALESCE($12, price_max),
                amenities = COALESCE($13, amenities),
                beach_distance_m = COALESCE($14, beach_distance_m),
                phone = COALESCE($15, phone),
                website = COALESCE($16, website),
                booking_url = COALESCE($17, booking_url),
                is_featured = COALESCE($18, is_featured),
                updated_at = NOW()
            WHERE id = $19 AND is_active = true
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(req.accommodation_type.map(|t| t.as_str()))
        .bind(&req.description)
        .bind(&req.address)
        .bind(&req.district)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.star_rating)
        .bind(req.rating)
        .bind(req.review_count)
        .bind(req.price_min)
        .bind(req.price_max)
        .bind(&req.amenities)
        .bind(req.beach_distance_m)
        .bind(&req.phone)
        .bind(&req.website)
        .bind(&req.booking_url)
        .bind(req.is_featured)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| GuideError::from_db(&format!("Update failed for accommodation {}", id), e))?
        .ok_or_else(|| GuideError::NotFound(format!("accommodation {}", id)))?;

        log::info!("Updated accommodation: {}", id);
        Ok(updated)
    }

    pub async fn delete_accommodation(pool: &PgPool, id: Uuid) -> Result<(), GuideError> {
        let rows = sqlx::query(
            "UPDATE accommodations SET is_active = false, updated_at = NOW() WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| GuideError::from_db(&format!("Delete failed for accommodation {}", id), e))?
        .rows_affected();

        if rows == 0 {
            return Err(GuideError::NotFound(format!("accommodation {}", id)));
        }

        log::info!("Deleted accommodation: {}", id);
        Ok(())
    }

    pub async fn existing_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Uuid>, GuideError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM accommodations WHERE id = ANY($1) AND is_active = true",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
        .map_err(|e| GuideError::from_db("Failed to check accommodation ids", e))
    }
}
