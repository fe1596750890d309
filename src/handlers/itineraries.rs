// src/handlers/itineraries.rs
// DOCUMENTATION: HTTP handlers for itineraries
// PURPOSE: Anonymous trip planning: create, share, edit with the edit token

use crate::config::Config;
use crate::errors::GuideError;
use crate::models::{LangQuery, SaveItineraryRequest};
use crate::services::{ItineraryService, WriteLimiter};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

pub const EDIT_TOKEN_HEADER: &str = "X-Edit-Token";

/// Client key for rate limiting: forwarded address when behind a proxy, else the peer
fn client_key(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

fn edit_token(req: &HttpRequest) -> Result<&str, GuideError> {
    req.headers()
        .get(EDIT_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            log::warn!("Itinerary write without {}", EDIT_TOKEN_HEADER);
            GuideError::Unauthorized
        })
}

/// POST /itineraries
/// Response carries the edit token; it is not returned again
pub async fn create_itinerary(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    limiter: web::Data<WriteLimiter>,
    req: HttpRequest,
    body: web::Json<SaveItineraryRequest>,
) -> Result<impl Responder, GuideError> {
    limiter.check(&client_key(&req))?;

    let created = ItineraryService::create(pool.get_ref(), &config, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// GET /itineraries/{id}
pub async fn get_itinerary(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, GuideError> {
    let itinerary = ItineraryService::get(pool.get_ref(), &config, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(itinerary))
}

/// PUT /itineraries/{id}
/// Full replace of header, days and items
pub async fn update_itinerary(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<SaveItineraryRequest>,
) -> Result<impl Responder, GuideError> {
    let token = edit_token(&req)?;
    let itinerary =
        ItineraryService::update(pool.get_ref(), &config, path.into_inner(), token, body.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(itinerary))
}

/// DELETE /itineraries/{id}
pub async fn delete_itinerary(
    pool: web::Data<PgPool>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<impl Responder, GuideError> {
    let token = edit_token(&req)?;
    ItineraryService::delete(pool.get_ref(), path.into_inner(), token).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /itineraries/{id}/travel
pub async fn itinerary_travel(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    path: web::Path<Uuid>,
    query: web::Query<LangQuery>,
) -> Result<impl Responder, GuideError> {
    let travel =
        ItineraryService::travel(pool.get_ref(), &config, path.into_inner(), query.lang.as_deref())
            .await?;
    Ok(HttpResponse::Ok().json(travel))
}

/// GET /itineraries/{id}/geojson
pub async fn itinerary_geojson(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, GuideError> {
    let collection = ItineraryService::geojson(pool.get_ref(), &config, path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/geo+json")
        .json(collection))
}

/// GET /itineraries/shared/{token}
pub async fn get_shared_itinerary(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<impl Responder, GuideError> {
    let itinerary = ItineraryService::get_shared(pool.get_ref(), &config, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(itinerary))
}

/// GET /itineraries/shared/{token}/travel
pub async fn shared_itinerary_travel(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    path: web::Path<String>,
    query: web::Query<LangQuery>,
) -> Result<impl Responder, GuideError> {
    let travel = ItineraryService::shared_travel(
        pool.get_ref(),
        &config,
        &path.into_inner(),
        query.lang.as_deref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(travel))
}

/// GET /itineraries/shared/{token}/geojson
pub async fn shared_itinerary_geojson(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<impl Responder, GuideError> {
    let collection =
        ItineraryService::shared_geojson(pool.get_ref(), &config, &path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/geo+json")
        .json(collection))
}

/// Shared routes are registered before /{id} so "shared" is never parsed as an id
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/itineraries")
            .route("", web::post().to(create_itinerary))
            .route("/shared/{token}", web::get().to(get_shared_itinerary))
            .route("/shared/{token}/travel", web::get().to(shared_itinerary_travel))
            .route("/shared/{token}/geojson", web::get().to(shared_itinerary_geojson))
            .route("/{id}", web::get().to(get_itinerary))
            .route("/{id}", web::put().to(update_itinerary))
            .route("/{id}", web::delete().to(delete_itinerary))
            .route("/{id}/travel", web::get().to(itinerary_travel))
            .route("/{id}/geojson", web::get().to(itinerary_geojson)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use sqlx::postgres::PgPoolOptions;

    // Every request below is rejected before the pool is touched
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
                    .app_data(web::Data::new(WriteLimiter::per_minute(2)))
                    .configure(config),
            )
            .await
        };
    }

    fn reversed_dates() -> serde_json::Value {
        serde_json::json!({
            "title": "Backwards",
            "start_date": "2026-11-05",
            "end_date": "2026-11-01"
        })
    }

    #[actix_rt::test]
    async fn test_create_validates_then_rate_limits() {
        let app = app!();

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/itineraries")
                .set_json(reversed_dates())
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        let req = test::TestRequest::post()
            .uri("/itineraries")
            .set_json(reversed_dates())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[actix_rt::test]
    async fn test_writes_without_edit_token_are_unauthorized() {
        let app = app!();
        let uri = format!("/itineraries/{}", Uuid::new_v4());

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::put()
            .uri(&uri)
            .set_json(reversed_dates())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_non_uuid_id_is_not_found() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/itineraries/not-a-uuid")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
