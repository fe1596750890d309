// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod accommodation;
pub mod image;
pub mod itinerary;
pub mod pagination;
pub mod place;
pub mod time_format;
pub mod travel;

pub use accommodation::*;
pub use image::*;
pub use itinerary::*;
pub use pagination::*;
pub use place::*;
pub use travel::*;
