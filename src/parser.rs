//! JSON decoding for backend responses.
//!
//! Whole documents must be valid JSON of the expected outer shape. Inside a
//! document, decoding is lenient: a record with a malformed field is skipped
//! (or the field reads as absent) instead of failing the whole response.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::model::Year;

/// Decodes a backend response body into `T`.
///
/// # Errors
///
/// Returns an error if the bytes are not JSON or the outer shape does not match `T`.
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).with_context(|| {
        format!(
            "failed to decode {} from {} bytes",
            std::any::type_name::<T>(),
            bytes.len()
        )
    })
}

/// Parses a percentage written either as `"12.34"` or `"12.34%"`.
pub fn parse_percent(s: &str) -> Option<f64> {
    s.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
}

fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
        Value::String(s) => parse_percent(s),
        _ => None,
    }
}

fn value_to_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().replace(',', "").parse::<u64>().ok(),
        _ => None,
    }
}

fn value_to_year(v: &Value) -> Option<Year> {
    value_to_u64(v).and_then(|y| Year::try_from(y).ok())
}

fn value_to_u32(v: &Value) -> Option<u32> {
    value_to_u64(v).and_then(|n| u32::try_from(n).ok())
}

pub(crate) fn percent<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(value_to_f64))
}

pub(crate) fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(value_to_u64))
}

pub(crate) fn seats<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(value_to_u32))
}

pub(crate) fn year<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Year>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(value_to_year))
}

/// Non-string values read as absent; blank strings too.
pub(crate) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

pub(crate) fn years<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Year>, D::Error> {
    let v = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
    Ok(v.iter().filter_map(value_to_year).collect())
}

pub(crate) fn names<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let v = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
    Ok(v.into_iter()
        .filter_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        })
        .collect())
}

/// A series aligned with some axis: malformed points become `None` so the alignment holds.
pub(crate) fn nullable_series<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Vec<Option<f64>>, D::Error> {
    let v = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
    Ok(v.iter().map(value_to_f64).collect())
}

/// A seat-count series aligned with some axis: malformed points count as 0.
pub(crate) fn count_series<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u32>, D::Error> {
    let v = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
    Ok(v.iter().map(|x| value_to_u32(x).unwrap_or(0)).collect())
}

/// `party → seats`, keeping the backend's key order. Entries with a non-integer count are dropped.
pub(crate) fn seat_map<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<IndexMap<String, u32>, D::Error> {
    let v = Option::<IndexMap<String, Value>>::deserialize(d)?.unwrap_or_default();
    Ok(v.into_iter()
        .filter_map(|(party, seats)| match value_to_u32(&seats) {
            Some(n) => Some((party, n)),
            None => {
                debug!(party = %party, value = %seats, "Skipping malformed seat count");
                None
            }
        })
        .collect())
}

pub(crate) fn series_map<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<IndexMap<String, Vec<Option<f64>>>, D::Error> {
    let v = Option::<IndexMap<String, Value>>::deserialize(d)?.unwrap_or_default();
    Ok(v.into_iter()
        .filter_map(|(key, series)| match series {
            Value::Array(points) => Some((key, points.iter().map(value_to_f64).collect())),
            _ => None,
        })
        .collect())
}

pub(crate) fn count_series_map<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<IndexMap<String, Vec<u32>>, D::Error> {
    let v = Option::<IndexMap<String, Value>>::deserialize(d)?.unwrap_or_default();
    Ok(v.into_iter()
        .filter_map(|(key, series)| match series {
            Value::Array(points) => Some((
                key,
                points.iter().map(|x| value_to_u32(x).unwrap_or(0)).collect(),
            )),
            _ => None,
        })
        .collect())
}

fn decode_record<T: DeserializeOwned>(value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!(error = %e, "Skipping malformed record");
            None
        }
    }
}

/// A list of records where undecodable entries are skipped.
pub(crate) fn records<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
    Ok(v.into_iter().filter_map(decode_record).collect())
}

pub(crate) fn record_lists<'de, D, T>(d: D) -> Result<IndexMap<String, Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<IndexMap<String, Value>>::deserialize(d)?.unwrap_or_default();
    Ok(v.into_iter()
        .filter_map(|(key, list)| match list {
            Value::Array(items) => Some((key, items.into_iter().filter_map(decode_record).collect())),
            _ => None,
        })
        .collect())
}

pub(crate) fn record_map<'de, D, T>(d: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<IndexMap<String, Value>>::deserialize(d)?.unwrap_or_default();
    Ok(v.into_iter()
        .filter_map(|(key, item)| decode_record(item).map(|r| (key, r)))
        .collect())
}
