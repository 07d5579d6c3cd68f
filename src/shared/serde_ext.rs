//! Small serde helpers shared by request DTOs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Parse a calendar day from either `YYYY-MM-DD` or a full timestamp
/// (`2025-01-31T10:00:00Z`, `2025-01-31T10:00:00`). The time part is discarded.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|ts| ts.date())
}

pub fn flexible_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

pub fn optional_flexible_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_flexible_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}"))),
    }
}

/// Query-string numbers where `?stateId=` means "no filter".
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s).map_err(serde::de::Error::custom).map(Some),
    }
}

/// Distinguish "field absent" from "field explicitly null" in a patch body.
/// Use together with `#[serde(default)]`: absent → `None`, `null` →
/// `Some(None)`, value → `Some(Some(v))`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        country: Option<Option<String>>,
        #[serde(default, deserialize_with = "optional_flexible_date")]
        date: Option<NaiveDate>,
    }

    #[derive(Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "empty_string_as_none")]
        state_id: Option<i32>,
    }

    #[test]
    fn empty_query_values_are_absent() {
        let empty: Params = serde_json::from_str(r#"{"state_id":""}"#).unwrap();
        assert_eq!(empty.state_id, None);
        let set: Params = serde_json::from_str(r#"{"state_id":"7"}"#).unwrap();
        assert_eq!(set.state_id, Some(7));
        assert!(serde_json::from_str::<Params>(r#"{"state_id":"seven"}"#).is_err());
    }

    #[test]
    fn parses_plain_and_timestamp_dates() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(parse_flexible_date("2025-03-14"), Some(day));
        assert_eq!(parse_flexible_date("2025-03-14T08:30:00Z"), Some(day));
        assert_eq!(parse_flexible_date("2025-03-14T08:30:00"), Some(day));
        assert_eq!(parse_flexible_date("14/03/2025"), None);
    }

    #[test]
    fn nullable_distinguishes_absent_from_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.country, None);
        assert_eq!(absent.date, None);

        let null: Patch = serde_json::from_str(r#"{"country":null}"#).unwrap();
        assert_eq!(null.country, Some(None));

        let set: Patch =
            serde_json::from_str(r#"{"country":"UAE","date":"2025-01-02"}"#).unwrap();
        assert_eq!(set.country, Some(Some("UAE".to_string())));
        assert_eq!(set.date, NaiveDate::from_ymd_opt(2025, 1, 2));
    }
}
