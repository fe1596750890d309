// src/handlers/accommodations.rs
// DOCUMENTATION: HTTP handlers for public accommodation reads

use crate::errors::GuideError;
use crate::handlers::places::cached_listing;
use crate::models::AccommodationQuery;
use crate::services::{AccommodationService, CatalogCache};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;

/// GET /accommodations
pub async fn list_accommodations(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<CatalogCache>>,
    req: HttpRequest,
    query: web::Query<AccommodationQuery>,
) -> Result<impl Responder, GuideError> {
    let key = CatalogCache::listing_key("accommodations", req.query_string());
    cached_listing(
        cache.get_ref(),
        key,
        AccommodationService::search_accommodations(pool.get_ref(), query.into_inner()),
    )
    .await
}

/// GET /accommodations/{id_or_slug}
pub async fn get_accommodation(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, GuideError> {
    let identifier = path.into_inner();
    let accommodation = AccommodationService::get_accommodation(pool.get_ref(), &identifier).await?;
    Ok(HttpResponse::Ok().json(accommodation))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/accommodations")
            .route("", web::get().to(list_accommodations))
            .route("/{id}", web::get().to(get_accommodation)),
    );
}
