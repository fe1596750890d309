// src/services/itinerary_service.rs
// DOCUMENTATION: Business logic for itineraries
// PURPOSE: Day normalisation, stop resolution, travel legs and token checks

use std::collections::HashMap;

use chrono::{Duration, NaiveTime, Timelike};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::db::{AccommodationRepository, ItineraryHeader, ItineraryRepository, PlaceRepository};
use crate::errors::GuideError;
use crate::models::*;
use crate::services::{landmarks, route_export, token, travel_time};

/// Validate a save request and expand it into one entry per trip date
pub fn normalize_days(req: &SaveItineraryRequest) -> Result<Vec<NormalizedDay>, GuideError> {
    if req.end_date < req.start_date {
        return Err(GuideError::ValidationError(
            "end_date must not be before start_date".to_string(),
        ));
    }

    let day_count = (req.end_date - req.start_date).num_days() + 1;
    if day_count > MAX_TRIP_DAYS {
        return Err(GuideError::ValidationError(format!(
            "a trip can last at most {} days, got {}",
            MAX_TRIP_DAYS, day_count
        )));
    }

    let mut by_number: HashMap<i32, &DayInput> = HashMap::new();
    for day in &req.days {
        if day.day_number < 1 || i64::from(day.day_number) > day_count {
            return Err(GuideError::ValidationError(format!(
                "day_number {} is outside 1..={}",
                day.day_number, day_count
            )));
        }
        if by_number.insert(day.day_number, day).is_some() {
            return Err(GuideError::ValidationError(format!(
                "day_number {} appears more than once",
                day.day_number
            )));
        }
    }

    let mut days = Vec::with_capacity(day_count as usize);
    for number in 1..=day_count as i32 {
        let date = req.start_date + Duration::days(i64::from(number) - 1);
        let Some(input) = by_number.get(&number) else {
            days.push(NormalizedDay {
                day_number: number,
                date,
                notes: None,
                items: Vec::new(),
            });
            continue;
        };

        if input.items.len() > MAX_ITEMS_PER_DAY {
            return Err(GuideError::ValidationError(format!(
                "day {} has {} items, the limit is {}",
                number,
                input.items.len(),
                MAX_ITEMS_PER_DAY
            )));
        }

        let mut items = input
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| normalize_item(number, i, item))
            .collect::<Result<Vec<_>, _>>()?;

        // Stable: equal start times keep the client's order
        items.sort_by_key(|item| item.start_time);
        for (order, item) in items.iter_mut().enumerate() {
            item.sort_order = order as i32;
        }

        days.push(NormalizedDay {
            day_number: number,
            date,
            notes: input.notes.clone(),
            items,
        });
    }

    Ok(days)
}

fn normalize_item(day_number: i32, index: usize, item: &ItemInput) -> Result<NormalizedItem, GuideError> {
    let stop = match (item.place_id, item.accommodation_id) {
        (Some(id), None) => StopRef::Place(id),
        (None, Some(id)) => StopRef::Accommodation(id),
        _ => {
            return Err(GuideError::ValidationError(format!(
                "day {} item {}: exactly one of place_id and accommodation_id is required",
                day_number,
                index + 1
            )))
        }
    };

    if let Some(end) = item.end_time {
        if end <= item.start_time {
            return Err(GuideError::ValidationError(format!(
                "day {} item {}: end_time must be after start_time",
                day_number,
                index + 1
            )));
        }
    }

    Ok(NormalizedItem {
        stop,
        start_time: item.start_time,
        end_time: item.end_time,
        travel_mode: item.travel_mode,
        notes: item.notes.clone(),
        sort_order: index as i32,
    })
}

/// Distinct place and accommodation ids referenced by the days
pub fn referenced_stops(days: &[NormalizedDay]) -> (Vec<Uuid>, Vec<Uuid>) {
    let mut places = Vec::new();
    let mut accommodations = Vec::new();
    for item in days.iter().flat_map(|d| d.items.iter()) {
        match item.stop {
            StopRef::Place(id) if !places.contains(&id) => places.push(id),
            StopRef::Accommodation(id) if !accommodations.contains(&id) => accommodations.push(id),
            _ => {}
        }
    }
    (places, accommodations)
}

/// A wrong edit token is 403; a missing one is rejected earlier with 401
pub fn check_edit_token(provided: &str, expected: &str) -> Result<(), GuideError> {
    if !token::matches(provided, expected) {
        log::warn!("Itinerary edit with invalid token");
        return Err(GuideError::Forbidden);
    }
    Ok(())
}

fn item_response(row: ItineraryItemRow) -> ItemResponse {
    let stop = match (row.place_id, row.accommodation_id) {
        (_, Some(id)) => StopRef::Accommodation(id),
        (Some(id), None) => StopRef::Place(id),
        (None, None) => StopRef::Place(Uuid::nil()),
    };
    let name = row.stop_name.unwrap_or_else(|| "Unknown stop".to_string());

    // Stops without coordinates borrow those of a matching landmark
    let (latitude, longitude) = match (row.latitude, row.longitude) {
        (Some(lat), Some(lng)) => (Some(lat), Some(lng)),
        _ => match landmarks::lookup(&name) {
            Some(landmark) => (Some(landmark.latitude), Some(landmark.longitude)),
            None => (None, None),
        },
    };

    ItemResponse {
        id: row.id,
        kind: stop.kind(),
        place_id: stop.place_id(),
        accommodation_id: stop.accommodation_id(),
        name,
        category: row.stop_category,
        latitude,
        longitude,
        start_time: row.start_time,
        end_time: row.end_time,
        travel_mode: row.travel_mode.and_then(|m| m.parse().ok()),
        notes: row.notes,
        sort_order: row.sort_order,
    }
}

/// Group item rows under their days
pub fn assemble(
    itinerary: Itinerary,
    days: Vec<ItineraryDay>,
    items: Vec<ItineraryItemRow>,
    share_url: String,
) -> ItineraryResponse {
    let mut items_by_day: HashMap<Uuid, Vec<ItemResponse>> = HashMap::new();
    for row in items {
        items_by_day
            .entry(row.day_id)
            .or_default()
            .push(item_response(row));
    }

    let days = days
        .into_iter()
        .map(|day| {
            let mut items = items_by_day.remove(&day.id).unwrap_or_default();
            items.sort_by_key(|i| i.sort_order);
            DayResponse {
                id: day.id,
                day_number: day.day_number,
                date: day.date,
                notes: day.notes,
                items,
            }
        })
        .collect();

    ItineraryResponse {
        id: itinerary.id,
        title: itinerary.title,
        description: itinerary.description,
        start_date: itinerary.start_date,
        end_date: itinerary.end_date,
        is_public: itinerary.is_public,
        share_token: itinerary.share_token,
        share_url,
        created_at: itinerary.created_at,
        updated_at: itinerary.updated_at,
        days,
    }
}

fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// One leg per pair of consecutive stops of each day
pub fn build_legs(days: &[DayResponse], locale: Locale) -> Vec<TravelLeg> {
    let mut legs = Vec::new();

    for day in days {
        for pair in day.items.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);

            let (distance_km, estimate, alternatives) = match (from.location(), to.location()) {
                (Some(a), Some(b)) => {
                    let distance = travel_time::haversine_km(a, b);
                    match to.travel_mode {
                        Some(mode) => {
                            let estimate = travel_time::estimate_for_distance(distance, mode, locale);
                            (Some(estimate.distance_km), Some(estimate), Vec::new())
                        }
                        None => {
                            let suggested = travel_time::suggested_mode(distance);
                            let all: Vec<TravelEstimate> = TravelMode::ALL
                                .iter()
                                .map(|m| travel_time::estimate_for_distance(distance, *m, locale))
                                .collect();
                            let chosen = all.iter().find(|e| e.mode == suggested).cloned();
                            (chosen.as_ref().map(|e| e.distance_km), chosen, all)
                        }
                    }
                }
                _ => (None, None, Vec::new()),
            };

            let tight_schedule = estimate.as_ref().is_some_and(|e| {
                let leave = minutes_of_day(from.end_time.unwrap_or(from.start_time));
                leave + e.duration_minutes > minutes_of_day(to.start_time)
            });

            legs.push(TravelLeg {
                day_number: day.day_number,
                from_item_id: from.id,
                to_item_id: to.id,
                from_name: from.name.clone(),
                to_name: to.name.clone(),
                distance_km,
                estimate,
                alternatives,
                tight_schedule,
            });
        }
    }

    legs
}

pub fn travel_summary(itinerary: &ItineraryResponse, locale: Locale) -> ItineraryTravelResponse {
    let legs = build_legs(&itinerary.days, locale);
    let total_distance_km = legs.iter().filter_map(|l| l.distance_km).sum::<f64>();
    let total_minutes = legs
        .iter()
        .filter_map(|l| l.estimate.as_ref())
        .map(|e| e.duration_minutes)
        .sum();

    ItineraryTravelResponse {
        itinerary_id: itinerary.id,
        locale,
        total_distance_km: (total_distance_km * 100.0).round() / 100.0,
        total_minutes,
        legs,
    }
}

pub struct ItineraryService;

impl ItineraryService {
    async fn check_stops_exist(pool: &PgPool, days: &[NormalizedDay]) -> Result<(), GuideError> {
        let (places, accommodations) = referenced_stops(days);

        let found = PlaceRepository::existing_ids(pool, &places).await?;
        if let Some(missing) = places.iter().find(|id| !found.contains(id)) {
            return Err(GuideError::ValidationError(format!("unknown place {}", missing)));
        }

        let found = AccommodationRepository::existing_ids(pool, &accommodations).await?;
        if let Some(missing) = accommodations.iter().find(|id| !found.contains(id)) {
            return Err(GuideError::ValidationError(format!(
                "unknown accommodation {}",
                missing
            )));
        }
        Ok(())
    }

    async fn load(pool: &PgPool, config: &Config, itinerary: Itinerary) -> Result<ItineraryResponse, GuideError> {
        let days = ItineraryRepository::days(pool, itinerary.id).await?;
        let items = ItineraryRepository::items(pool, itinerary.id).await?;
        let share_url = config.share_url(&itinerary.share_token);
        Ok(assemble(itinerary, days, items, share_url))
    }

    fn header(req: &SaveItineraryRequest) -> ItineraryHeader<'_> {
        ItineraryHeader {
            title: req.title.trim(),
            description: req.description.as_deref(),
            start_date: req.start_date,
            end_date: req.end_date,
            is_public: req.is_public,
        }
    }

    pub async fn create(
        pool: &PgPool,
        config: &Config,
        req: SaveItineraryRequest,
    ) -> Result<CreatedItineraryResponse, GuideError> {
        req.validate()?;
        let days = normalize_days(&req)?;
        Self::check_stops_exist(pool, &days).await?;

        let edit_token = token::generate();
        let share_token = token::generate();
        let itinerary =
            ItineraryRepository::create(pool, &Self::header(&req), &days, &share_token, &edit_token)
                .await?;

        Ok(CreatedItineraryResponse {
            itinerary: Self::load(pool, config, itinerary).await?,
            edit_token,
        })
    }

    pub async fn get(pool: &PgPool, config: &Config, id: Uuid) -> Result<ItineraryResponse, GuideError> {
        let itinerary = ItineraryRepository::get_by_id(pool, id).await?;
        Self::load(pool, config, itinerary).await
    }

    /// Only public itineraries can be read through their share token
    pub async fn get_shared(
        pool: &PgPool,
        config: &Config,
        token: &str,
    ) -> Result<ItineraryResponse, GuideError> {
        let itinerary = ItineraryRepository::get_by_share_token(pool, token).await?;
        Self::load(pool, config, itinerary).await
    }

    pub async fn update(
        pool: &PgPool,
        config: &Config,
        id: Uuid,
        edit_token: &str,
        req: SaveItineraryRequest,
    ) -> Result<ItineraryResponse, GuideError> {
        let current = ItineraryRepository::get_by_id(pool, id).await?;
        check_edit_token(edit_token, &current.edit_token)?;

        req.validate()?;
        let days = normalize_days(&req)?;
        Self::check_stops_exist(pool, &days).await?;

        let itinerary = ItineraryRepository::replace(pool, id, &Self::header(&req), &days).await?;
        Self::load(pool, config, itinerary).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid, edit_token: &str) -> Result<(), GuideError> {
        let current = ItineraryRepository::get_by_id(pool, id).await?;
        check_edit_token(edit_token, &current.edit_token)?;
        ItineraryRepository::delete(pool, id).await
    }

    pub async fn travel(
        pool: &PgPool,
        config: &Config,
        id: Uuid,
        lang: Option<&str>,
    ) -> Result<ItineraryTravelResponse, GuideError> {
        let itinerary = Self::get(pool, config, id).await?;
        Ok(travel_summary(&itinerary, Locale::resolve(lang, &config.default_locale)))
    }

    pub async fn shared_travel(
        pool: &PgPool,
        config: &Config,
        token: &str,
        lang: Option<&str>,
    ) -> Result<ItineraryTravelResponse, GuideError> {
        let itinerary = Self::get_shared(pool, config, token).await?;
        Ok(travel_summary(&itinerary, Locale::resolve(lang, &config.default_locale)))
    }

    pub async fn geojson(
        pool: &PgPool,
        config: &Config,
        id: Uuid,
    ) -> Result<geojson::FeatureCollection, GuideError> {
        let itinerary = Self::get(pool, config, id).await?;
        Ok(route_export::itinerary_to_geojson(&itinerary))
    }

    pub async fn shared_geojson(
        pool: &PgPool,
        config: &Config,
        token: &str,
    ) -> Result<geojson::FeatureCollection, GuideError> {
        let itinerary = Self::get_shared(pool, config, token).await?;
        Ok(route_export::itinerary_to_geojson(&itinerary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use tokio_test::{assert_err, assert_ok};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn place_item(h: u32) -> ItemInput {
        ItemInput {
            place_id: Some(Uuid::new_v4()),
            accommodation_id: None,
            start_time: time(h, 0),
            end_time: None,
            travel_mode: None,
            notes: None,
        }
    }

    fn request(start: u32, end: u32, days: Vec<DayInput>) -> SaveItineraryRequest {
        SaveItineraryRequest {
            title: "Nha Trang".to_string(),
            description: None,
            start_date: date(start),
            end_date: date(end),
            is_public: true,
            days,
        }
    }

    #[test]
    fn test_missing_days_are_filled() {
        let req = request(
            2,
            4,
            vec![DayInput {
                day_number: 2,
                notes: Some("Islands".to_string()),
                items: vec![place_item(9)],
            }],
        );
        let days = normalize_days(&req).unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, date(2));
        assert!(days[0].items.is_empty());
        assert_eq!(days[1].date, date(3));
        assert_eq!(days[1].notes.as_deref(), Some("Islands"));
        assert_eq!(days[1].items.len(), 1);
        assert_eq!(days[2].day_number, 3);
    }

    #[test]
    fn test_items_sorted_by_start_time_stably() {
        let mut late = place_item(14);
        late.notes = Some("late".to_string());
        let mut first_nine = place_item(9);
        first_nine.notes = Some("a".to_string());
        let mut second_nine = place_item(9);
        second_nine.notes = Some("b".to_string());

        let req = request(
            2,
            2,
            vec![DayInput {
                day_number: 1,
                notes: None,
                items: vec![late, first_nine, second_nine],
            }],
        );
        let days = normalize_days(&req).unwrap();
        let notes: Vec<_> = days[0]
            .items
            .iter()
            .map(|i| i.notes.clone().unwrap())
            .collect();
        assert_eq!(notes, vec!["a", "b", "late"]);
        let orders: Vec<_> = days[0].items.iter().map(|i| i.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_date_rules() {
        assert_err!(normalize_days(&request(5, 4, vec![])));
        assert_ok!(normalize_days(&request(4, 4, vec![])));

        let long = SaveItineraryRequest {
            end_date: date(1) + Duration::days(30),
            ..request(1, 1, vec![])
        };
        assert!(matches!(
            normalize_days(&long),
            Err(GuideError::ValidationError(_))
        ));

        let thirty = SaveItineraryRequest {
            end_date: date(1) + Duration::days(29),
            ..request(1, 1, vec![])
        };
        assert_eq!(normalize_days(&thirty).unwrap().len(), 30);
    }

    #[test]
    fn test_day_number_rules() {
        let out_of_range = request(
            1,
            2,
            vec![DayInput {
                day_number: 3,
                notes: None,
                items: vec![],
            }],
        );
        assert_err!(normalize_days(&out_of_range));

        let duplicate = request(
            1,
            2,
            vec![
                DayInput {
                    day_number: 1,
                    notes: None,
                    items: vec![],
                },
                DayInput {
                    day_number: 1,
                    notes: None,
                    items: vec![],
                },
            ],
        );
        assert_err!(normalize_days(&duplicate));
    }

    #[test]
    fn test_item_reference_rules() {
        let mut both = place_item(9);
        both.accommodation_id = Some(Uuid::new_v4());
        let mut neither = place_item(9);
        neither.place_id = None;

        for item in [both, neither] {
            let req = request(
                1,
                1,
                vec![DayInput {
                    day_number: 1,
                    notes: None,
                    items: vec![item],
                }],
            );
            assert_err!(normalize_days(&req));
        }
    }

    #[test]
    fn test_end_time_after_start() {
        let mut item = place_item(10);
        item.end_time = Some(time(9, 30));
        let req = request(
            1,
            1,
            vec![DayInput {
                day_number: 1,
                notes: None,
                items: vec![item],
            }],
        );
        assert_err!(normalize_days(&req));
    }

    #[test]
    fn test_items_per_day_limit() {
        let items = (0..31).map(|i| place_item(i % 24)).collect();
        let req = request(
            1,
            1,
            vec![DayInput {
                day_number: 1,
                notes: None,
                items,
            }],
        );
        assert_err!(normalize_days(&req));
    }

    #[test]
    fn test_referenced_stops_dedupes() {
        let shared = Uuid::new_v4();
        let mut a = place_item(9);
        a.place_id = Some(shared);
        let mut b = place_item(10);
        b.place_id = Some(shared);
        let mut hotel = place_item(20);
        hotel.place_id = None;
        hotel.accommodation_id = Some(Uuid::new_v4());

        let req = request(
            1,
            1,
            vec![DayInput {
                day_number: 1,
                notes: None,
                items: vec![a, b, hotel],
            }],
        );
        let (places, accommodations) = referenced_stops(&normalize_days(&req).unwrap());
        assert_eq!(places, vec![shared]);
        assert_eq!(accommodations.len(), 1);
    }

    #[test]
    fn test_edit_token_check() {
        assert!(matches!(check_edit_token("xyz", "abc"), Err(GuideError::Forbidden)));
        assert!(matches!(check_edit_token("", "abc"), Err(GuideError::Forbidden)));
        assert_ok!(check_edit_token("abc", "abc"));
        assert!(matches!(check_edit_token("abcd", "abc"), Err(GuideError::Forbidden)));
    }

    fn stop(name: &str, coords: Option<(f64, f64)>, start: NaiveTime, mode: Option<TravelMode>) -> ItemResponse {
        ItemResponse {
            id: Uuid::new_v4(),
            kind: "place",
            place_id: Some(Uuid::new_v4()),
            accommodation_id: None,
            name: name.to_string(),
            category: None,
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            start_time: start,
            end_time: None,
            travel_mode: mode,
            notes: None,
            sort_order: 0,
        }
    }

    fn day(items: Vec<ItemResponse>) -> DayResponse {
        DayResponse {
            id: Uuid::new_v4(),
            day_number: 1,
            date: date(7),
            notes: None,
            items,
        }
    }

    #[test]
    fn test_legs_with_chosen_and_suggested_modes() {
        // Cathedral -> Dam Market is about 1 km, Dam Market -> Po Nagar about 1.2 km
        let items = vec![
            stop("Cathedral", Some((12.2467, 109.1883)), time(8, 0), None),
            stop("Dam Market", Some((12.2551, 109.1916)), time(9, 0), None),
            stop("Po Nagar", Some((12.2654, 109.1954)), time(10, 0), Some(TravelMode::Driving)),
        ];
        let legs = build_legs(&[day(items)], Locale::En);
        assert_eq!(legs.len(), 2);

        let walk = &legs[0];
        assert_eq!(walk.estimate.as_ref().unwrap().mode, TravelMode::Walking);
        assert_eq!(walk.alternatives.len(), 3);
        assert!(!walk.tight_schedule);

        let drive = &legs[1];
        assert_eq!(drive.estimate.as_ref().unwrap().mode, TravelMode::Driving);
        assert!(drive.alternatives.is_empty());
    }

    #[test]
    fn test_tight_schedule_and_unlocated_stop() {
        let mut first = stop("Hon Chong", Some((12.2727, 109.2047)), time(8, 0), None);
        first.end_time = Some(time(9, 55));
        let items = vec![
            first,
            // Cam Ranh airport, ~30 km away, ten minutes later
            stop("Airport", Some((11.9982, 109.2194)), time(10, 5), Some(TravelMode::Driving)),
            stop("Somewhere", None, time(18, 0), None),
        ];
        let legs = build_legs(&[day(items)], Locale::Vi);
        assert!(legs[0].tight_schedule);
        assert!(legs[1].estimate.is_none());
        assert!(legs[1].distance_km.is_none());
        assert!(!legs[1].tight_schedule);
    }

    #[test]
    fn test_assemble_groups_items_and_falls_back_to_landmarks() {
        let itinerary = Itinerary {
            id: Uuid::new_v4(),
            title: "Trip".to_string(),
            description: None,
            start_date: date(7),
            end_date: date(8),
            share_token: "share".to_string(),
            edit_token: "edit".to_string(),
            is_public: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let day1 = ItineraryDay {
            id: Uuid::new_v4(),
            itinerary_id: itinerary.id,
            day_number: 1,
            date: date(7),
            notes: None,
        };
        let day2 = ItineraryDay {
            day_number: 2,
            date: date(8),
            id: Uuid::new_v4(),
            ..day1.clone()
        };
        let row = ItineraryItemRow {
            id: Uuid::new_v4(),
            day_id: day2.id,
            place_id: Some(Uuid::new_v4()),
            accommodation_id: None,
            start_time: time(9, 0),
            end_time: None,
            travel_mode: Some("walking".to_string()),
            notes: None,
            sort_order: 0,
            stop_name: Some("Chợ Đầm".to_string()),
            stop_category: Some("shopping".to_string()),
            latitude: None,
            longitude: None,
        };

        let response = assemble(itinerary, vec![day1, day2], vec![row], "url".to_string());
        assert!(response.days[0].items.is_empty());

        let item = &response.days[1].items[0];
        assert_eq!(item.kind, "place");
        assert_eq!(item.travel_mode, Some(TravelMode::Walking));
        assert!(item.latitude.is_some(), "landmark fallback should locate Cho Dam");
    }

    #[test]
    fn test_travel_summary_totals() {
        let items = vec![
            stop("Cathedral", Some((12.2467, 109.1883)), time(8, 0), Some(TravelMode::Walking)),
            stop("Dam Market", Some((12.2551, 109.1916)), time(9, 0), Some(TravelMode::Walking)),
        ];
        let itinerary = ItineraryResponse {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: None,
            start_date: date(7),
            end_date: date(7),
            is_public: true,
            share_token: "s".to_string(),
            share_url: "u".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            days: vec![day(items)],
        };
        let summary = travel_summary(&itinerary, Locale::En);
        assert_eq!(summary.legs.len(), 1);
        let leg = summary.legs[0].estimate.as_ref().unwrap();
        assert_eq!(summary.total_minutes, leg.duration_minutes);
        assert!(summary.total_distance_km > 0.5 && summary.total_distance_km < 1.5);
    }
}
