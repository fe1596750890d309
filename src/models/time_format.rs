// src/models/time_format.rs
// DOCUMENTATION: Serde helpers for wall-clock times in itineraries
// PURPOSE: Accept "HH:MM" or "HH:MM:SS", always emit "HH:MM"

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

const OUTPUT_FORMAT: &str = "%H:%M";

pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{}', expected HH:MM", raw))
}

pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format(OUTPUT_FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_time(&raw).map_err(serde::de::Error::custom)
}

pub mod option {
    use super::*;

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => super::serialize(t, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => parse_time(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Slot {
        #[serde(with = "super")]
        start: NaiveTime,
        #[serde(default, with = "super::option")]
        end: Option<NaiveTime>,
    }

    #[test]
    fn test_accepts_short_and_long_forms() {
        let slot: Slot = serde_json::from_str(r#"{"start":"08:30","end":"10:15:00"}"#).unwrap();
        assert_eq!(slot.start, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(slot.end, NaiveTime::from_hms_opt(10, 15, 0));

        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["start"], "08:30");
        assert_eq!(json["end"], "10:15");
    }

    #[test]
    fn test_missing_and_blank_end() {
        let slot: Slot = serde_json::from_str(r#"{"start":"07:00"}"#).unwrap();
        assert!(slot.end.is_none());

        let slot: Slot = serde_json::from_str(r#"{"start":"07:00","end":""}"#).unwrap();
        assert!(slot.end.is_none());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Slot>(r#"{"start":"25:00"}"#).is_err());
        assert!(parse_time("noon").is_err());
    }
}
