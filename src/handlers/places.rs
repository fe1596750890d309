// src/handlers/places.rs
// DOCUMENTATION: HTTP handlers for public place reads
// PURPOSE: Parse requests, call services, return responses

use crate::errors::GuideError;
use crate::models::PlaceQuery;
use crate::services::{CatalogCache, PlaceService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;

/// Serve a listing from the cache, or compute, store and serve it.
/// Errors are never cached.
pub(crate) async fn cached_listing<T, F>(
    cache: &CatalogCache,
    key: String,
    fetch: F,
) -> Result<HttpResponse, GuideError>
where
    T: Serialize,
    F: Future<Output = Result<T, GuideError>>,
{
    if let Some(body) = cache.get(&key).await {
        return Ok(HttpResponse::Ok()
            .content_type("application/json")
            .insert_header(("X-Cache", "HIT"))
            .body(body));
    }

    // Read before fetching: a clear() during the fetch must win
    let generation = cache.generation();
    let value = fetch.await?;
    let body = serde_json::to_string(&value).map_err(|e| {
        log::error!("Failed to serialize listing {}: {}", key, e);
        GuideError::InternalError
    })?;
    cache.set_if_generation(key, body.clone(), generation).await;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .insert_header(("X-Cache", "MISS"))
        .body(body))
}

/// GET /places
/// Filtered, paginated listing (cached per normalized query string)
pub async fn list_places(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    query: web::Query<PlaceQuery>,
) -> Result<impl Responder, GuideError> {
    let key = CatalogCache::listing_key("places", req.query_string());
    cached_listing(
        cache.get_ref(),
        key,
        PlaceService::search_places(pool.get_ref(), query.into_inner()),
    )
    .await
}

/// GET /places/{id_or_slug}
pub async fn get_place(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, GuideError> {
    let identifier = path.into_inner();
    let place = PlaceService::get_place(pool.get_ref(), &identifier).await?;
    Ok(HttpResponse::Ok().json(place))
}

/// Configuration for place routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/places")
            .route("", web::get().to(list_places))
            .route("/{id}", web::get().to(get_place)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_cached_listing_miss_then_hit() {
        let cache = CatalogCache::new(60);
        let key = CatalogCache::listing_key("places", "category=shopping");

        let first = cached_listing(&cache, key.clone(), async {
            Ok::<_, GuideError>(serde_json::json!({"data": [], "total": 0}))
        })
        .await
        .unwrap();
        assert_eq!(first.headers().get("X-Cache").unwrap(), "MISS");

        let second = cached_listing(&cache, key, async {
            Err::<serde_json::Value, _>(GuideError::InternalError)
        })
        .await
        .unwrap();
        assert_eq!(second.headers().get("X-Cache").unwrap(), "HIT");

        let body = to_bytes(second.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total"], 0);
    }

    #[actix_rt::test]
    async fn test_errors_are_not_cached() {
        let cache = CatalogCache::new(60);
        let result = cached_listing(&cache, "places?".to_string(), async {
            Err::<serde_json::Value, _>(GuideError::InvalidInput("bad".to_string()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(cache.stats().await.total_entries, 0);
    }

    #[actix_rt::test]
    async fn test_listing_read_before_admin_write_is_not_cached() {
        let cache = CatalogCache::new(60);
        let key = CatalogCache::listing_key("places", "featured=true");

        let resp = cached_listing(&cache, key.clone(), async {
            // Admin write commits while the rows are being read
            cache.clear().await;
            Ok::<_, GuideError>(serde_json::json!({"data": ["old"], "total": 1}))
        })
        .await
        .unwrap();
        assert_eq!(resp.headers().get("X-Cache").unwrap(), "MISS");
        assert!(cache.get(&key).await.is_none());

        let again = cached_listing(&cache, key, async {
            Ok::<_, GuideError>(serde_json::json!({"data": [], "total": 0}))
        })
        .await
        .unwrap();
        assert_eq!(again.headers().get("X-Cache").unwrap(), "MISS");
    }
}
