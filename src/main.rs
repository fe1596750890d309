// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, and start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use services::{start_cleanup_task, start_prune_task, CatalogCache, WriteLimiter};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            &config.log_level
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    log::info!("Starting nhatrang-guide...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Listing cache, swept every 5 minutes
    let cache = Arc::new(CatalogCache::new(config.cache_ttl_seconds));
    start_cleanup_task(cache.clone(), 300);
    log::info!(
        "Initialized listing cache (TTL: {}s)",
        config.cache_ttl_seconds
    );

    // 6. Per-client limiter for itinerary creation, idle clients pruned every 5 minutes
    let limiter = Arc::new(WriteLimiter::per_minute(config.rate_limit_per_minute));
    start_prune_task(limiter.clone(), 300);
    let limiter = web::Data::from(limiter);
    log::info!(
        "Itinerary writes limited to {}/min per client",
        config.rate_limit_per_minute
    );

    // 7. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_clone = config.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(web::Data::new(cache.clone()))
            .app_data(limiter.clone())
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            .configure(handlers::health_config)
            .configure(handlers::places_config)
            .configure(handlers::accommodations_config)
            .configure(handlers::itineraries_config)
            .configure(handlers::travel_config)
            .configure(handlers::admin_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
