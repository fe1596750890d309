// src/services/landmarks.rs
// DOCUMENTATION: Static gazetteer of well-known Nha Trang points
// PURPOSE: Fallback coordinates for stops whose catalog row has none

use geo_types::Point;
use serde::Serialize;

use super::slug::normalize_name;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Landmark {
    pub key: &'static str,
    pub name_vi: &'static str,
    pub name_en: &'static str,
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    pub latitude: f64,
    pub longitude: f64,
}

impl Landmark {
    pub fn location(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        [self.name_vi, self.name_en]
            .into_iter()
            .chain(self.aliases.iter().copied())
    }
}

pub const CITY_CENTRE: Landmark = Landmark {
    key: "city-centre",
    name_vi: "Trung tâm Nha Trang",
    name_en: "Nha Trang city centre",
    aliases: &["nha trang city center", "trung tam thanh pho nha trang"],
    latitude: 12.2388,
    longitude: 109.1967,
};

pub static LANDMARKS: &[Landmark] = &[
    CITY_CENTRE,
    Landmark {
        key: "po-nagar",
        name_vi: "Tháp Bà Ponagar",
        name_en: "Po Nagar Cham Towers",
        aliases: &["po nagar", "ponagar", "thap ba"],
        latitude: 12.2654,
        longitude: 109.1954,
    },
    Landmark {
        key: "long-son-pagoda",
        name_vi: "Chùa Long Sơn",
        name_en: "Long Son Pagoda",
        aliases: &["long son"],
        latitude: 12.2509,
        longitude: 109.1803,
    },
    Landmark {
        key: "dam-market",
        name_vi: "Chợ Đầm",
        name_en: "Dam Market",
        aliases: &["cho dam nha trang"],
        latitude: 12.2551,
        longitude: 109.1916,
    },
    Landmark {
        key: "hon-chong",
        name_vi: "Hòn Chồng",
        name_en: "Hon Chong Promontory",
        aliases: &["hon chong cape"],
        latitude: 12.2727,
        longitude: 109.2047,
    },
    Landmark {
        key: "tran-phu-beach",
        name_vi: "Bãi biển Trần Phú",
        name_en: "Tran Phu Beach",
        aliases: &["nha trang beach", "bai bien nha trang"],
        latitude: 12.2430,
        longitude: 109.1970,
    },
    Landmark {
        key: "night-market",
        name_vi: "Chợ đêm Nha Trang",
        name_en: "Nha Trang Night Market",
        aliases: &["night market"],
        latitude: 12.2396,
        longitude: 109.1968,
    },
    Landmark {
        key: "cathedral",
        name_vi: "Nhà thờ Núi",
        name_en: "Nha Trang Cathedral",
        aliases: &["nha tho chanh toa kito vua", "stone church"],
        latitude: 12.2467,
        longitude: 109.1883,
    },
    Landmark {
        key: "vinpearl-cable-car",
        name_vi: "Ga cáp treo Vinpearl",
        name_en: "Vinpearl cable car station",
        aliases: &["vinpearl cable car", "cap treo vinpearl"],
        latitude: 12.2196,
        longitude: 109.2012,
    },
    Landmark {
        key: "railway-station",
        name_vi: "Ga Nha Trang",
        name_en: "Nha Trang Railway Station",
        aliases: &["nha trang train station"],
        latitude: 12.2486,
        longitude: 109.1846,
    },
    Landmark {
        key: "cam-ranh-airport",
        name_vi: "Sân bay Cam Ranh",
        name_en: "Cam Ranh International Airport",
        aliases: &["cam ranh airport", "cxr"],
        latitude: 11.9982,
        longitude: 109.2194,
    },
];

/// Find a landmark by name, ignoring case and Vietnamese accents.
/// An exact name wins; otherwise the longest known name contained in the query.
pub fn lookup(name: &str) -> Option<&'static Landmark> {
    let query = normalize_name(name);
    if query.is_empty() {
        return None;
    }

    if let Some(exact) = LANDMARKS
        .iter()
        .find(|l| l.names().any(|n| normalize_name(n) == query))
    {
        return Some(exact);
    }

    let padded = format!(" {} ", query);
    LANDMARKS
        .iter()
        .filter_map(|l| {
            l.names()
                .map(normalize_name)
                .filter(|n| n.len() >= 4 && padded.contains(&format!(" {} ", n)))
                .map(|n| n.len())
                .max()
                .map(|len| (len, l))
        })
        .max_by_key(|(len, _)| *len)
        .map(|(_, l)| l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup_ignores_accents() {
        assert_eq!(lookup("cho dam").unwrap().key, "dam-market");
        assert_eq!(lookup("CHỢ ĐẦM").unwrap().key, "dam-market");
        assert_eq!(lookup("Po Nagar Cham Towers").unwrap().key, "po-nagar");
    }

    #[test]
    fn test_contained_lookup() {
        assert_eq!(
            lookup("Sunset drinks near Hon Chong").unwrap().key,
            "hon-chong"
        );
        assert_eq!(
            lookup("Vinpearl cable car (ticket office)").unwrap().key,
            "vinpearl-cable-car"
        );
    }

    #[test]
    fn test_unknown_name() {
        assert!(lookup("Some new bistro").is_none());
        assert!(lookup("   ").is_none());
    }

    #[test]
    fn test_landmarks_are_in_khanh_hoa() {
        for landmark in LANDMARKS {
            assert!((11.9..12.4).contains(&landmark.latitude), "{}", landmark.key);
            assert!((109.1..109.3).contains(&landmark.longitude), "{}", landmark.key);
        }
    }
}
