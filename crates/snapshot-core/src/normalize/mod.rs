//! Per-provider record normalizers.
//!
//! Each submodule exposes `normalize(&Value) -> Result<NormalizedRecord>` for
//! one upstream schema. [`crate::provider::Provider`] picks among them. The
//! helpers below encode the presence rules shared by all three: `null` counts
//! as absent, identifiers are always strings, and sequences are only kept
//! when non-empty.

pub mod datasift;
pub mod gnip;
pub mod tweepy;

use serde_json::Value;

use crate::error::{Result, SnapshotError};
use crate::models::Geo;

/// Coerce a string or integer identifier to its string form.
///
/// Integers go through `serde_json`'s own formatting, which keeps every digit
/// of a 64-bit id.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First of `pointers` that resolves to an identifier.
pub(crate) fn first_id(raw: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .find_map(|p| raw.pointer(p).and_then(id_string))
}

/// Identifier at `pointer`, or [`SnapshotError::MissingField`].
pub(crate) fn required_id(raw: &Value, pointer: &'static str) -> Result<String> {
    raw.pointer(pointer)
        .and_then(id_string)
        .ok_or(SnapshotError::MissingField(pointer))
}

/// String at `pointer`, or [`SnapshotError::MissingField`].
pub(crate) fn required_str<'a>(raw: &'a Value, pointer: &'static str) -> Result<&'a str> {
    raw.pointer(pointer)
        .and_then(Value::as_str)
        .ok_or(SnapshotError::MissingField(pointer))
}

/// String at `pointer`; `None` when absent, null or not a string.
pub(crate) fn opt_string(raw: &Value, pointer: &str) -> Option<String> {
    raw.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Collect `key` from every object of the array at `pointer`.
///
/// `None` when the array is missing or yields nothing.
pub(crate) fn pluck(raw: &Value, pointer: &str, key: &str) -> Option<Vec<String>> {
    let items = raw.pointer(pointer)?.as_array()?;
    non_empty(
        items
            .iter()
            .filter_map(|item| item.get(key).and_then(id_string))
            .collect(),
    )
}

/// The array of scalars at `pointer`, each coerced to a string.
pub(crate) fn scalars(raw: &Value, pointer: &str) -> Option<Vec<String>> {
    let items = raw.pointer(pointer)?.as_array()?;
    non_empty(items.iter().filter_map(id_string).collect())
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Coordinate pair stored as `[latitude, longitude]`.
pub(crate) fn geo_lat_lon(value: &Value) -> Option<Geo> {
    let (first, second) = coordinate_pair(value)?;
    Some(Geo {
        latitude: first,
        longitude: second,
    })
}

/// Coordinate pair stored GeoJSON-style as `[longitude, latitude]`.
pub(crate) fn geo_lon_lat(value: &Value) -> Option<Geo> {
    let (first, second) = coordinate_pair(value)?;
    Some(Geo {
        latitude: second,
        longitude: first,
    })
}

fn coordinate_pair(value: &Value) -> Option<(f64, f64)> {
    match value.as_array()?.as_slice() {
        [a, b, ..] => Some((a.as_f64()?, b.as_f64()?)),
        _ => None,
    }
}
