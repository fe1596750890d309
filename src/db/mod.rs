// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod accommodation_repository;
pub mod filters;
pub mod image_repository;
pub mod itinerary_repository;
pub mod place_repository;
pub mod stats_repository;

pub use accommodation_repository::*;
pub use image_repository::*;
pub use itinerary_repository::*;
pub use place_repository::*;
pub use stats_repository::*;
