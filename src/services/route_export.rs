// src/services/route_export.rs
// DOCUMENTATION: GeoJSON rendering of an itinerary
// PURPOSE: Map layers for the front end: one point per stop, one line per day

use geo_types::{LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use crate::models::{DayResponse, ItineraryResponse};

fn feature(geometry: Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn properties(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

fn day_features(day: &DayResponse) -> Vec<Feature> {
    let mut features = Vec::new();
    let mut route: Vec<Point<f64>> = Vec::new();

    for (order, item) in day.items.iter().enumerate() {
        let Some(point) = item.location() else {
            continue;
        };
        route.push(point);

        features.push(feature(
            Geometry::new(Value::from(&point)),
            properties(json!({
                "feature_type": "stop",
                "item_id": item.id,
                "day": day.day_number,
                "order": order + 1,
                "name": item.name,
                "kind": item.kind,
                "category": item.category,
                "start_time": item.start_time.format("%H:%M").to_string(),
            })),
        ));
    }

    if route.len() >= 2 {
        let line: LineString<f64> = route.into_iter().collect();
        features.push(feature(
            Geometry::new(Value::from(&line)),
            properties(json!({
                "feature_type": "route",
                "day": day.day_number,
                "date": day.date,
            })),
        ));
    }

    features
}

/// Stops without coordinates are left out of the collection
pub fn itinerary_to_geojson(itinerary: &ItineraryResponse) -> FeatureCollection {
    let features = itinerary.days.iter().flat_map(day_features).collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("itinerary_id".to_string(), json!(itinerary.id));
    foreign_members.insert("title".to_string(), json!(itinerary.title));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemResponse;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    fn item(name: &str, coords: Option<(f64, f64)>, hour: u32) -> ItemResponse {
        ItemResponse {
            id: Uuid::new_v4(),
            kind: "place",
            place_id: Some(Uuid::new_v4()),
            accommodation_id: None,
            name: name.to_string(),
            category: Some("attraction".to_string()),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end_time: None,
            travel_mode: None,
            notes: None,
            sort_order: 0,
        }
    }

    fn itinerary(days: Vec<DayResponse>) -> ItineraryResponse {
        ItineraryResponse {
            id: Uuid::new_v4(),
            title: "Weekend".to_string(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2026, 11, 7).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 11, 8).unwrap(),
            is_public: true,
            share_token: "tok".to_string(),
            share_url: "http://localhost/itineraries/shared/tok".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            days,
        }
    }

    #[test]
    fn test_points_and_route_per_day() {
        let day1 = DayResponse {
            id: Uuid::new_v4(),
            day_number: 1,
            date: NaiveDate::from_ymd_opt(2026, 11, 7).unwrap(),
            notes: None,
            items: vec![
                item("Po Nagar", Some((12.2654, 109.1954)), 8),
                item("Mystery stop", None, 10),
                item("Dam Market", Some((12.2551, 109.1916)), 11),
            ],
        };
        let day2 = DayResponse {
            id: Uuid::new_v4(),
            day_number: 2,
            date: NaiveDate::from_ymd_opt(2026, 11, 8).unwrap(),
            notes: None,
            items: vec![item("Hon Chong", Some((12.2727, 109.2047)), 9)],
        };

        let collection = itinerary_to_geojson(&itinerary(vec![day1, day2]));

        // 3 located stops + 1 route for day 1 (day 2 has a single stop)
        assert_eq!(collection.features.len(), 4);

        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["title"], "Weekend");

        let first = &json["features"][0];
        assert_eq!(first["geometry"]["type"], "Point");
        assert_eq!(first["geometry"]["coordinates"][0], 109.1954);
        assert_eq!(first["properties"]["start_time"], "08:00");
        assert_eq!(first["properties"]["day"], 1);
        assert_eq!(first["properties"]["order"], 1);
        assert_eq!(first["properties"]["kind"], "place");
        assert!(first["properties"].get("day_number").is_none());

        let route = &json["features"][2];
        assert_eq!(route["geometry"]["type"], "LineString");
        assert_eq!(route["geometry"]["coordinates"].as_array().unwrap().len(), 2);
        assert_eq!(route["properties"]["day"], 1);

        let last = &json["features"][3];
        assert_eq!(last["properties"]["day"], 2);
        assert_eq!(last["properties"]["name"], "Hon Chong");
    }

    #[test]
    fn test_empty_itinerary() {
        let collection = itinerary_to_geojson(&itinerary(vec![]));
        assert!(collection.features.is_empty());
    }
}
