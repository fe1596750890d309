// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod accommodations;
pub mod admin;
pub mod health;
pub mod itineraries;
pub mod places;
pub mod travel;

pub use accommodations::config as accommodations_config;
pub use admin::config as admin_config;
pub use health::config as health_config;
pub use itineraries::config as itineraries_config;
pub use places::config as places_config;
pub use travel::config as travel_config;
