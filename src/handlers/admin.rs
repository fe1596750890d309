// src/handlers/admin.rs
// DOCUMENTATION: Back-office handlers for catalog management
// PURPOSE: Places, accommodations, image sets and statistics behind X-Admin-Token

use crate::config::Config;
use crate::db::StatsRepository;
use crate::errors::GuideError;
use crate::models::{
    AddImageRequest, CreateAccommodationRequest, CreatePlaceRequest, ImageOwner,
    ReorderImagesRequest, UpdateAccommodationRequest, UpdatePlaceRequest,
};
use crate::services::{token, AccommodationService, CatalogCache, ImageService, PlaceService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// Helper function to verify admin authentication
/// DOCUMENTATION: Checks X-Admin-Token header against configured admin token
fn verify_admin_token(req: &HttpRequest, config: &Config) -> Result<(), GuideError> {
    let provided = req
        .headers()
        .get("X-Admin-Token")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            log::warn!("Admin request without token");
            GuideError::Unauthorized
        })?;

    if !token::matches(provided, &config.admin_token) {
        log::warn!("Admin request with invalid token");
        return Err(GuideError::Forbidden);
    }

    Ok(())
}

/// Run an admin write; once it succeeds the listing cache is cleared
async fn invalidating<T, F>(cache: &CatalogCache, write: F) -> Result<T, GuideError>
where
    F: Future<Output = Result<T, GuideError>>,
{
    let result = write.await?;
    cache.clear().await;
    Ok(result)
}

/// POST /admin/places
pub async fn create_place(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    body: web::Json<CreatePlaceRequest>,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    let place = invalidating(
        cache.get_ref(),
        PlaceService::create_place(pool.get_ref(), body.into_inner()),
    )
    .await?;
    Ok(HttpResponse::Created().json(place))
}

/// PUT /admin/places/{id}
/// Partial update: absent fields are left untouched
pub async fn update_place(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePlaceRequest>,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    let place = invalidating(
        cache.get_ref(),
        PlaceService::update_place(pool.get_ref(), path.into_inner(), body.into_inner()),
    )
    .await?;
    Ok(HttpResponse::Ok().json(place))
}

/// DELETE /admin/places/{id}
/// Soft delete; itineraries keep referencing the row
pub async fn delete_place(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    invalidating(
        cache.get_ref(),
        PlaceService::delete_place(pool.get_ref(), path.into_inner()),
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /admin/places/import
/// Body is a JSON array of place objects; invalid rows are reported, not fatal
pub async fn import_places(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    body: web::Json<Vec<serde_json::Value>>,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    let rows = body.into_inner();
    if rows.is_empty() {
        return Err(GuideError::InvalidInput("import batch is empty".to_string()));
    }
    log::info!("Admin import requested for {} places", rows.len());

    let report =
        invalidating(cache.get_ref(), PlaceService::import_places(pool.get_ref(), rows)).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// POST /admin/accommodations
pub async fn create_accommodation(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    body: web::Json<CreateAccommodationRequest>,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    let accommodation = invalidating(
        cache.get_ref(),
        AccommodationService::create_accommodation(pool.get_ref(), body.into_inner()),
    )
    .await?;
    Ok(HttpResponse::Created().json(accommodation))
}

/// PUT /admin/accommodations/{id}
pub async fn update_accommodation(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdateAccommodationRequest>,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    let accommodation = invalidating(
        cache.get_ref(),
        AccommodationService::update_accommodation(
            pool.get_ref(),
            path.into_inner(),
            body.into_inner(),
        ),
    )
    .await?;
    Ok(HttpResponse::Ok().json(accommodation))
}

/// DELETE /admin/accommodations/{id}
pub async fn delete_accommodation(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    invalidating(
        cache.get_ref(),
        AccommodationService::delete_accommodation(pool.get_ref(), path.into_inner()),
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /admin/{owner_kind}/{id}/images
/// owner_kind is "places" or "accommodations"
pub async fn add_image(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    path: web::Path<(String, Uuid)>,
    body: web::Json<AddImageRequest>,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    let (kind, owner_id) = path.into_inner();
    let owner: ImageOwner = kind.parse()?;
    let image = invalidating(
        cache.get_ref(),
        ImageService::add_image(pool.get_ref(), owner, owner_id, body.into_inner()),
    )
    .await?;
    Ok(HttpResponse::Created().json(image))
}

/// PUT /admin/{owner_kind}/{id}/images/order
pub async fn reorder_images(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    path: web::Path<(String, Uuid)>,
    body: web::Json<ReorderImagesRequest>,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    let (kind, owner_id) = path.into_inner();
    let owner: ImageOwner = kind.parse()?;
    let images = invalidating(
        cache.get_ref(),
        ImageService::reorder(pool.get_ref(), owner, owner_id, body.into_inner().image_ids),
    )
    .await?;
    Ok(HttpResponse::Ok().json(images))
}

/// PUT /admin/{owner_kind}/{id}/images/{image_id}/thumbnail
pub async fn set_thumbnail(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    path: web::Path<(String, Uuid, Uuid)>,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    let (kind, owner_id, image_id) = path.into_inner();
    let owner: ImageOwner = kind.parse()?;
    let images = invalidating(
        cache.get_ref(),
        ImageService::set_thumbnail(pool.get_ref(), owner, owner_id, image_id),
    )
    .await?;
    Ok(HttpResponse::Ok().json(images))
}

/// DELETE /admin/{owner_kind}/{id}/images/{image_id}
pub async fn delete_image(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    path: web::Path<(String, Uuid, Uuid)>,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    let (kind, owner_id, image_id) = path.into_inner();
    let owner: ImageOwner = kind.parse()?;
    invalidating(
        cache.get_ref(),
        ImageService::delete_image(pool.get_ref(), owner, owner_id, image_id),
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /admin/stats
/// DOCUMENTATION: Catalog counts, average ratings, itinerary totals and cache state
pub async fn stats(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
) -> Result<impl Responder, GuideError> {
    verify_admin_token(&req, &config)?;

    let catalog = StatsRepository::catalog_stats(pool.get_ref()).await?;
    let cache_stats = cache.stats().await;

    Ok(HttpResponse::Ok().json(json!({
        "catalog": catalog,
        "cache": cache_stats,
    })))
}

/// Configuration for admin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/stats", web::get().to(stats))
            .route("/places", web::post().to(create_place))
            .route("/places/import", web::post().to(import_places))
            .route("/places/{id}", web::put().to(update_place))
            .route("/places/{id}", web::delete().to(delete_place))
            .route("/accommodations", web::post().to(create_accommodation))
            .route("/accommodations/{id}", web::put().to(update_accommodation))
            .route("/accommodations/{id}", web::delete().to(delete_accommodation))
            .route("/{owner_kind}/{id}/images", web::post().to(add_image))
            .route("/{owner_kind}/{id}/images/order", web::put().to(reorder_images))
            .route(
                "/{owner_kind}/{id}/images/{image_id}/thumbnail",
                web::put().to(set_thumbnail),
            )
            .route(
                "/{owner_kind}/{id}/images/{image_id}",
                web::delete().to(delete_image),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use sqlx::postgres::PgPoolOptions;

    // Requests below fail authentication or parsing before any query runs
    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .unwrap()
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(lazy_pool()))
                    .app_data(web::Data::new(Config::for_tests()))
                    .app_data(web::Data::new(Arc::new(CatalogCache::new(60))))
                    .configure(config),
            )
            .await
        };
    }

    #[actix_rt::test]
    async fn test_missing_token_is_unauthorized() {
        let app = app!();
        let req = test::TestRequest::get().uri("/admin/stats").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[actix_rt::test]
    async fn test_wrong_token_is_forbidden() {
        let app = app!();
        let req = test::TestRequest::delete()
            .uri(&format!("/admin/places/{}", Uuid::new_v4()))
            .insert_header(("X-Admin-Token", "wrong"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn test_unknown_image_owner_is_rejected() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri(&format!("/admin/itineraries/{}/images", Uuid::new_v4()))
            .insert_header(("X-Admin-Token", "secret"))
            .set_json(serde_json::json!({"url": "https://cdn.example.com/a.jpg"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_empty_import_is_rejected() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/admin/places/import")
            .insert_header(("X-Admin-Token", "secret"))
            .set_json(serde_json::json!([]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    async fn warm(cache: &CatalogCache) {
        let generation = cache.generation();
        cache
            .set_if_generation("places?".to_string(), "[]".to_string(), generation)
            .await;
    }

    #[actix_rt::test]
    async fn test_successful_write_clears_listings() {
        let cache = CatalogCache::new(60);
        warm(&cache).await;

        let images = invalidating(&cache, async { Ok::<_, GuideError>(vec!["a", "b"]) })
            .await
            .unwrap();
        assert_eq!(images, vec!["a", "b"]);
        assert!(cache.get("places?").await.is_none());
    }

    #[actix_rt::test]
    async fn test_failed_write_keeps_listings() {
        let cache = CatalogCache::new(60);
        warm(&cache).await;

        let result = invalidating(&cache, async {
            Err::<(), _>(GuideError::NotFound("image".to_string()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(cache.get("places?").await, Some("[]".to_string()));
    }
}
