// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service status

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::services::{landmarks, CatalogCache};
use std::sync::Arc;

pub async fn health_check(cache: web::Data<Arc<CatalogCache>>) -> impl Responder {
    let stats = cache.stats().await;
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "nhatrang-guide",
        "version": env!("CARGO_PKG_VERSION"),
        "landmarks": landmarks::LANDMARKS.len(),
        "cache": stats,
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_rt::test]
    async fn test_health_reports_ok() {
        let cache = Arc::new(CatalogCache::new(60));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(cache))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "nhatrang-guide");
        assert_eq!(body["cache"]["total_entries"], 0);
    }
}
