//! Zone and attraction loading from JSON files
//!
//! Accepts either a bare array or an object wrapping the array under
//! `"zones"` / `"attractions"`. Field names follow the mobile client's
//! payloads (`latitude`, `longitude`, `radius`, `alertLevel`, `type`) as well
//! as the crate's own serialized form.

use crate::{
    AlertLevel, Attraction, Coordinate, DangerZone, GeofenceError, Result, SafetyLevel,
    ZoneCategory,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Sanitize ID (alphanumeric, dash, underscore only)
fn sanitize_id(id: String) -> String {
    id.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(128)
        .collect()
}

/// Sanitized ID, or `{prefix}-{index}` when nothing usable remains
fn entry_id(raw: Option<String>, prefix: &str, index: usize) -> String {
    let id = raw.map(sanitize_id).unwrap_or_default();
    if id.is_empty() {
        format!("{}-{}", prefix, index)
    } else {
        id
    }
}

/// Limit display names to printable text
fn sanitize_name(name: String) -> String {
    name.chars().filter(|c| !c.is_control()).take(256).collect()
}

fn coordinate(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinate> {
    let coord = Coordinate {
        latitude: lat?,
        longitude: lon?,
    };
    coord.is_valid().then_some(coord)
}

/// Raw zone from JSON
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawZone {
    id: Option<String>,
    name: Option<String>,
    #[serde(alias = "type")]
    category: Option<ZoneCategory>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    center: Option<Coordinate>,
    #[serde(alias = "radius", alias = "radius_m")]
    radius_m: Option<f64>,
    #[serde(alias = "alert_level")]
    alert_level: Option<AlertLevel>,
}

/// Raw attraction from JSON
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttraction {
    id: Option<String>,
    name: Option<String>,
    #[serde(alias = "type")]
    kind: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    location: Option<Coordinate>,
    rating: Option<f64>,
    #[serde(alias = "safety_level")]
    safety_level: Option<SafetyLevel>,
}

/// Records that deserialized, with their position in the file
struct Records<T> {
    entries: Vec<(usize, T)>,
    skipped: usize,
}

/// Extract the record array from either layout. Entries that do not
/// deserialize (unknown enum values, wrong types) are skipped and counted.
fn records<T: DeserializeOwned>(raw: serde_json::Value, key: &'static str) -> Result<Records<T>> {
    let items = match raw {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove(key) {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Err(GeofenceError::UnrecognizedFormat(key)),
        },
        _ => return Err(GeofenceError::UnrecognizedFormat(key)),
    };

    let mut entries = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value(item) {
            Ok(entry) => entries.push((i, entry)),
            Err(e) => {
                warn!("Skipping {} entry {}: {}", key, i, e);
                skipped += 1;
            }
        }
    }

    Ok(Records { entries, skipped })
}

/// Parse danger zones from a JSON string
pub fn parse_zones(json: &str) -> Result<Vec<DangerZone>> {
    let raw: serde_json::Value = serde_json::from_str(json)?;
    zones_from_raw(records(raw, "zones")?)
}

/// Load danger zones from a JSON file
pub fn load_zones(path: impl AsRef<Path>) -> Result<Vec<DangerZone>> {
    let path = path.as_ref();
    info!("Loading danger zones from {:?}", path);

    let reader = BufReader::new(File::open(path)?);
    let raw: serde_json::Value = serde_json::from_reader(reader)?;
    zones_from_raw(records(raw, "zones")?)
}

fn zones_from_raw(raw: Records<RawZone>) -> Result<Vec<DangerZone>> {
    let mut zones = Vec::with_capacity(raw.entries.len());
    let mut seen = HashSet::new();
    let mut skipped = raw.skipped;

    for (i, entry) in raw.entries {
        let raw_id = entry.id.clone();
        let center = match entry.center {
            Some(c) if c.is_valid() => Some(c),
            Some(_) => None,
            None => coordinate(entry.latitude, entry.longitude),
        };
        let Some(center) = center else {
            skipped += 1;
            continue;
        };

        let zone = DangerZone {
            id: entry_id(entry.id, "zone", i),
            name: sanitize_name(entry.name.unwrap_or_else(|| "Unknown".to_string())),
            category: entry.category.unwrap_or(ZoneCategory::Restricted),
            center,
            radius_m: entry.radius_m.unwrap_or(0.0),
            alert_level: entry.alert_level.unwrap_or(AlertLevel::Medium),
        };

        if let Err(e) = zone.validate() {
            warn!("Skipping zone: {}", e);
            skipped += 1;
            continue;
        }

        if !seen.insert(zone.id.clone()) {
            warn!(
                "Duplicate zone id {} (from {:?}), keeping the first",
                zone.id, raw_id
            );
            skipped += 1;
            continue;
        }

        zones.push(zone);
    }

    info!("Loaded {} danger zones ({} skipped)", zones.len(), skipped);

    Ok(zones)
}

/// Parse attractions from a JSON string
pub fn parse_attractions(json: &str) -> Result<Vec<Attraction>> {
    let raw: serde_json::Value = serde_json::from_str(json)?;
    attractions_from_raw(records(raw, "attractions")?)
}

/// Load attractions from a JSON file
pub fn load_attractions(path: impl AsRef<Path>) -> Result<Vec<Attraction>> {
    let path = path.as_ref();
    info!("Loading attractions from {:?}", path);

    let reader = BufReader::new(File::open(path)?);
    let raw: serde_json::Value = serde_json::from_reader(reader)?;
    attractions_from_raw(records(raw, "attractions")?)
}

fn attractions_from_raw(raw: Records<RawAttraction>) -> Result<Vec<Attraction>> {
    let mut attractions = Vec::with_capacity(raw.entries.len());
    let mut skipped = raw.skipped;

    for (i, entry) in raw.entries {
        let location = match entry.location {
            Some(c) if c.is_valid() => Some(c),
            Some(_) => None,
            None => coordinate(entry.latitude, entry.longitude),
        };
        let Some(location) = location else {
            skipped += 1;
            continue;
        };

        attractions.push(Attraction {
            id: entry_id(entry.id, "poi", i),
            name: sanitize_name(entry.name.unwrap_or_else(|| "Unknown".to_string())),
            kind: entry.kind.unwrap_or_default(),
            location,
            rating: entry.rating.unwrap_or(0.0).clamp(0.0, 5.0),
            safety_level: entry.safety_level.unwrap_or(SafetyLevel::Caution),
        });
    }

    info!("Loaded {} attractions ({} skipped)", attractions.len(), skipped);

    Ok(attractions)
}
