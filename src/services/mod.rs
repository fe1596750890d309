// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod accommodation_service;
pub mod cache;
pub mod image_service;
pub mod itinerary_service;
pub mod landmarks;
pub mod place_service;
pub mod rate_limit;
pub mod route_export;
pub mod slug;
pub mod token;
pub mod travel_time;

pub use accommodation_service::AccommodationService;
pub use cache::*;
pub use image_service::ImageService;
pub use itinerary_service::ItineraryService;
pub use place_service::{ImportReport, PlaceService};
pub use rate_limit::{start_prune_task, WriteLimiter};
