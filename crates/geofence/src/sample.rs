//! Built-in zones and attractions for New Delhi, used when no data file
//! is configured.

use crate::{AlertLevel, Attraction, Coordinate, DangerZone, SafetyLevel, ZoneCategory};

/// Default map center (New Delhi)
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    latitude: 28.6139,
    longitude: 77.2090,
};

pub fn danger_zones() -> Vec<DangerZone> {
    let zones = vec![
        ("old-delhi-crime", "High Crime Area - Old Delhi", ZoneCategory::Crime, 28.6562, 77.2410, 1000.0, AlertLevel::High),
        ("yamuna-flood", "Flood Risk - Yamuna Banks", ZoneCategory::NaturalHazard, 28.6304, 77.2177, 2000.0, AlertLevel::Medium),
        ("central-flood", "Flood Zone", ZoneCategory::NaturalHazard, 28.6200, 77.2100, 500.0, AlertLevel::High),
        ("central-crime", "Crime Hotspot", ZoneCategory::Crime, 28.6100, 77.2200, 300.0, AlertLevel::Medium),
    ];

    zones
        .into_iter()
        .map(|(id, name, category, lat, lon, radius_m, alert_level)| DangerZone {
            id: id.to_string(),
            name: name.to_string(),
            category,
            center: Coordinate {
                latitude: lat,
                longitude: lon,
            },
            radius_m,
            alert_level,
        })
        .collect()
}

pub fn attractions() -> Vec<Attraction> {
    let attractions = vec![
        ("india-gate", "India Gate", "Monument", 28.6129, 77.2295, 4.5, SafetyLevel::Safe),
        ("red-fort", "Red Fort", "Historical", 28.6562, 77.2410, 4.3, SafetyLevel::Caution),
        ("connaught-place", "Connaught Place", "Shopping", 28.6315, 77.2167, 4.2, SafetyLevel::Caution),
    ];

    attractions
        .into_iter()
        .map(|(id, name, kind, lat, lon, rating, safety_level)| Attraction {
            id: id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            location: Coordinate {
                latitude: lat,
                longitude: lon,
            },
            rating,
            safety_level,
        })
        .collect()
}
