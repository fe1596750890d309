// src/db/filters.rs
// DOCUMENTATION: SQL fragments shared by the catalog repositories
// PURPOSE: Bound-parameter filters for dynamic listing queries

use sqlx::{Postgres, QueryBuilder};

/// Escape LIKE wildcards in user input and wrap it for substring matching
pub fn like_pattern(raw: &str) -> String {
    let escaped = raw
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Haversine distance in km between `alias`.latitude/longitude and a bound origin.
/// LEAST() keeps rounding noise from pushing asin() out of its domain.
pub fn push_distance_km(qb: &mut QueryBuilder<'_, Postgres>, alias: &str, lat: f64, lng: f64) {
    qb.push("(2 * 6371 * asin(LEAST(1, sqrt(power(sin(radians(")
        .push(alias)
        .push(".latitude - ")
        .push_bind(lat)
        .push(") / 2), 2) + cos(radians(")
        .push_bind(lat)
        .push(")) * cos(radians(")
        .push(alias)
        .push(".latitude)) * power(sin(radians(")
        .push(alias)
        .push(".longitude - ")
        .push_bind(lng)
        .push(") / 2), 2)))))");
}

/// Origin of a proximity search, only when both coordinates are given
pub fn origin(lat: Option<f64>, lng: Option<f64>) -> Option<(f64, f64)> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some((lat, lng)),
        _ => None,
    }
}

/// Thumbnail (or first image) of an image set, joined as `thumbnail_url`
pub fn thumbnail_join(owner_kind: &str, alias: &str) -> String {
    format!(
        r#"
        LEFT JOIN LATERAL (
            SELECT url
            FROM place_images
            WHERE owner_kind = '{kind}' AND owner_id = {alias}.id
            ORDER BY is_thumbnail DESC, sort_order ASC, created_at ASC
            LIMIT 1
        ) thumb ON true
        "#,
        kind = owner_kind,
        alias = alias
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" bún chả "), "%bún chả%");
        assert_eq!(like_pattern("100%_real"), "%100\\%\\_real%");
    }

    #[test]
    fn test_origin_requires_both() {
        assert_eq!(origin(Some(12.2), Some(109.1)), Some((12.2, 109.1)));
        assert_eq!(origin(Some(12.2), None), None);
    }

    #[test]
    fn test_distance_sql_binds_origin() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        push_distance_km(&mut qb, "p", 12.24, 109.19);
        let sql = qb.sql();
        assert!(sql.contains("p.latitude - $1"));
        assert!(sql.contains("radians($2)"));
        assert!(sql.contains("p.longitude - $3"));
    }
}
