// src/services/travel_time.rs
// DOCUMENTATION: Travel-time estimation between two stops
// PURPOSE: Great-circle distance plus constant-speed duration, formatted per locale
//
// Nothing here calls a routing service: the estimate is the Haversine distance
// divided by the average speed of the mode.

use geo_types::Point;

use crate::models::{Locale, TravelEstimate, TravelMode, TravelOptions};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Up to this distance walking is the suggested mode
pub const WALKING_SUGGESTION_MAX_KM: f64 = 1.5;

/// Distance between two points (x = longitude, y = latitude) in kilometers
/// Uses Haversine formula
pub fn haversine_km(from: Point<f64>, to: Point<f64>) -> f64 {
    let (lat1, lon1) = (from.y(), from.x());
    let (lat2, lon2) = (to.y(), to.x());

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + (lat1.to_radians().cos()) * (lat2.to_radians().cos()) * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Whole minutes at the mode's average speed; a non-zero distance is at least one minute
pub fn duration_minutes(distance_km: f64, mode: TravelMode) -> u32 {
    if distance_km <= 0.0 {
        return 0;
    }
    let minutes = (distance_km / mode.speed_kmh() * 60.0).round() as u32;
    minutes.max(1)
}

pub fn format_distance(distance_km: f64, locale: Locale) -> String {
    let metres = (distance_km * 1000.0).round() as u64;
    if metres < 1000 {
        return format!("{} m", metres);
    }

    let km = format!("{:.1}", distance_km);
    match locale {
        Locale::Vi => format!("{} km", km.replace('.', ",")),
        Locale::En => format!("{} km", km),
    }
}

pub fn format_duration(minutes: u32, locale: Locale) -> String {
    let (hours, rest) = (minutes / 60, minutes % 60);
    match (locale, hours, rest) {
        (Locale::Vi, 0, m) => format!("{} phút", m),
        (Locale::Vi, h, 0) => format!("{} giờ", h),
        (Locale::Vi, h, m) => format!("{} giờ {} phút", h, m),
        (Locale::En, 0, m) => format!("{} min", m),
        (Locale::En, h, 0) => format!("{} h", h),
        (Locale::En, h, m) => format!("{} h {} min", h, m),
    }
}

pub fn suggested_mode(distance_km: f64) -> TravelMode {
    if distance_km <= WALKING_SUGGESTION_MAX_KM {
        TravelMode::Walking
    } else {
        TravelMode::Driving
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimate for a known distance
pub fn estimate_for_distance(distance_km: f64, mode: TravelMode, locale: Locale) -> TravelEstimate {
    let minutes = duration_minutes(distance_km, mode);
    TravelEstimate {
        mode,
        distance_km: round2(distance_km),
        duration_minutes: minutes,
        distance_text: format_distance(distance_km, locale),
        duration_text: format_duration(minutes, locale),
    }
}

pub fn estimate(from: Point<f64>, to: Point<f64>, mode: TravelMode, locale: Locale) -> TravelEstimate {
    estimate_for_distance(haversine_km(from, to), mode, locale)
}

/// One estimate per mode and the suggested mode for the distance
pub fn estimate_all(from: Point<f64>, to: Point<f64>, locale: Locale) -> TravelOptions {
    let distance_km = haversine_km(from, to);
    TravelOptions {
        distance_km: round2(distance_km),
        distance_text: format_distance(distance_km, locale),
        suggested_mode: suggested_mode(distance_km),
        estimates: TravelMode::ALL
            .iter()
            .map(|mode| estimate_for_distance(distance_km, *mode, locale))
            .collect(),
    }
}
