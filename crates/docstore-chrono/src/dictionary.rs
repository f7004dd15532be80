//! Mapping-key adapter: temporal types as dictionary keys.
//!
//! The wire format only supports string object keys, so a mapping keyed by
//! a temporal type goes through an intermediate string-keyed object. Keys
//! are converted with the same pattern table as document fields; values
//! pass through serde unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ConvertError, Result};
use crate::patterns;

/// A temporal type usable as a mapping key.
///
/// `parse_key(to_key(k)) == k` for every valid key, and the key string is
/// the type's canonical document encoding.
pub trait DictionaryKey: Sized + Ord {
    fn to_key(&self) -> Result<String>;
    fn parse_key(key: &str) -> Result<Self>;
}

impl DictionaryKey for DateTime<Utc> {
    fn to_key(&self) -> Result<String> {
        patterns::format_instant(self)
    }

    fn parse_key(key: &str) -> Result<Self> {
        patterns::parse_instant(key)
    }
}

impl DictionaryKey for NaiveDate {
    fn to_key(&self) -> Result<String> {
        Ok(patterns::format_local_date(self))
    }

    fn parse_key(key: &str) -> Result<Self> {
        patterns::parse_local_date(key)
    }
}

impl DictionaryKey for NaiveDateTime {
    fn to_key(&self) -> Result<String> {
        Ok(patterns::format_local_date_time(self))
    }

    fn parse_key(key: &str) -> Result<Self> {
        patterns::parse_local_date_time(key)
    }
}

impl DictionaryKey for NaiveTime {
    fn to_key(&self) -> Result<String> {
        Ok(patterns::format_time_span(patterns::local_time_nanos(self)))
    }

    fn parse_key(key: &str) -> Result<Self> {
        patterns::nanos_to_local_time(patterns::parse_time_span(key)?)
    }
}

/// Writes a temporal-keyed mapping as a string-keyed JSON object.
pub fn write_map<K, V>(map: &BTreeMap<K, V>) -> Result<Value>
where
    K: DictionaryKey,
    V: Serialize,
{
    let mut object = Map::new();
    for (key, value) in map {
        let node = serde_json::to_value(value)
            .map_err(|err| ConvertError::invalid_text("map value", err.to_string()))?;
        object.insert(key.to_key()?, node);
    }
    Ok(Value::Object(object))
}

/// Reads a temporal-keyed mapping back from its string-keyed JSON object.
///
/// A JSON `null` reads as an empty mapping, matching how the wire format
/// represents an absent map.
pub fn read_map<K, V>(node: &Value) -> Result<BTreeMap<K, V>>
where
    K: DictionaryKey,
    V: DeserializeOwned,
{
    let object = match node {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Object(object) => object,
        other => {
            return Err(ConvertError::MalformedComposite(format!(
                "a keyed mapping must be a JSON object, got {other}"
            )))
        }
    };

    let mut map = BTreeMap::new();
    for (key, value) in object {
        let parsed = K::parse_key(key)?;
        let value: V = serde_json::from_value(value.clone())
            .map_err(|err| ConvertError::invalid_text("map value", err.to_string()))?;
        map.insert(parsed, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_instant_keyed_map_roundtrip() {
        let first = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let mut map = BTreeMap::new();
        map.insert(first, "new year".to_string());
        map.insert(second, "day two".to_string());

        let node = write_map(&map).unwrap();
        assert_eq!(
            node,
            json!({
                "2026-01-01T00:00:00.000000000Z": "new year",
                "2026-01-02T00:00:00.000000000Z": "day two",
            })
        );

        let read: BTreeMap<DateTime<Utc>, String> = read_map(&node).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[&first], "new year");
        assert_eq!(read[&second], "day two");
    }

    #[test]
    fn test_local_date_keyed_map_roundtrip() {
        let mut map = BTreeMap::new();
        map.insert(NaiveDate::from_ymd_opt(2026, 4, 29).unwrap(), 7u32);
        let node = write_map(&map).unwrap();
        assert_eq!(node, json!({"2026-04-29": 7}));
        let read: BTreeMap<NaiveDate, u32> = read_map(&node).unwrap();
        assert_eq!(read, map);
    }

    #[test]
    fn test_local_time_keys_use_span_strings() {
        let mut map = BTreeMap::new();
        map.insert(NaiveTime::from_hms_opt(7, 0, 0).unwrap(), true);
        let node = write_map(&map).unwrap();
        assert_eq!(node, json!({"07:00:00": true}));
        let read: BTreeMap<NaiveTime, bool> = read_map(&node).unwrap();
        assert_eq!(read, map);
    }

    #[test]
    fn test_null_reads_as_empty_map() {
        let read: BTreeMap<NaiveDate, u32> = read_map(&Value::Null).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn test_non_object_node_is_malformed() {
        let result: Result<BTreeMap<NaiveDate, u32>> = read_map(&json!([1, 2]));
        assert!(matches!(
            result.unwrap_err(),
            ConvertError::MalformedComposite(_)
        ));
    }

    #[test]
    fn test_unparseable_key_is_an_error() {
        let result: Result<BTreeMap<NaiveDate, u32>> = read_map(&json!({"not a date": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_instant_key_rejected_on_write() {
        let mut map = BTreeMap::new();
        map.insert(
            patterns::max_iso_instant() + chrono::Duration::nanoseconds(1),
            0u8,
        );
        assert!(write_map(&map).is_err());
    }
}
