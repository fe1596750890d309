// src/handlers/travel.rs
// DOCUMENTATION: Stateless travel-time endpoints
// PURPOSE: Point-to-point estimates and the landmark gazetteer

use crate::config::Config;
use crate::errors::GuideError;
use crate::models::{point_from, EstimateQuery, LangQuery, Locale};
use crate::services::{landmarks, travel_time};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/// GET /travel/estimate
/// Single-mode estimate when `mode` is given, otherwise every mode plus the suggestion
pub async fn estimate(
    config: web::Data<Config>,
    query: web::Query<EstimateQuery>,
) -> Result<impl Responder, GuideError> {
    let query = query.into_inner();
    let locale = Locale::resolve(query.lang.as_deref(), &config.default_locale);

    let from = point_from(Some(query.from_lat), Some(query.from_lng))?
        .ok_or_else(|| GuideError::InvalidInput("origin is required".to_string()))?;
    let to = point_from(Some(query.to_lat), Some(query.to_lng))?
        .ok_or_else(|| GuideError::InvalidInput("destination is required".to_string()))?;

    match query.mode {
        Some(mode) => Ok(HttpResponse::Ok().json(travel_time::estimate(from, to, mode, locale))),
        None => Ok(HttpResponse::Ok().json(travel_time::estimate_all(from, to, locale))),
    }
}

/// GET /travel/landmarks
pub async fn list_landmarks(
    config: web::Data<Config>,
    query: web::Query<LangQuery>,
) -> impl Responder {
    let locale = Locale::resolve(query.lang.as_deref(), &config.default_locale);
    let centre = landmarks::CITY_CENTRE.location();

    let items: Vec<_> = landmarks::LANDMARKS
        .iter()
        .map(|l| {
            let from_centre = travel_time::estimate_all(centre, l.location(), locale);
            json!({
                "key": l.key,
                "name": match locale {
                    Locale::Vi => l.name_vi,
                    Locale::En => l.name_en,
                },
                "latitude": l.latitude,
                "longitude": l.longitude,
                "from_city_centre": from_centre.distance_text,
            })
        })
        .collect();

    HttpResponse::Ok().json(items)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/travel")
            .route("/estimate", web::get().to(estimate))
            .route("/landmarks", web::get().to(list_landmarks)),
    );
}
