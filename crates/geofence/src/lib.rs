//! Danger Zone Geofencing
//!
//! Circular danger zones (center + radius) checked against a device
//! position using great-circle distance.
//!
//! # Matching Model
//!
//! ```text
//! inside(p, z) = haversine(p, z.center) <= z.radius_m
//! ```
//!
//! | Operation | Result |
//! |-----------|--------|
//! | `find_enclosing_zone` | First matching zone in list order |
//! | `enclosing_zones` | All matches, ranked by alert level, then distance |
//! | `most_severe_zone` | Head of the ranked list |
//! | `ZoneTracker::update` | Entered / Exited transitions only |

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::f64::consts::PI;
use thiserror::Error;

pub mod loader;
pub mod overlay;
pub mod sample;
pub mod tracker;

pub use tracker::{ZoneEvent, ZoneTracker};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default search radius for nearby attractions in meters
pub const DEFAULT_ATTRACTION_RADIUS_M: f64 = 5_000.0;

#[derive(Error, Debug)]
pub enum GeofenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("Invalid radius for zone {0}: {1}")]
    InvalidRadius(String, f64),
    #[error("Unrecognized {0} file layout")]
    UnrecognizedFormat(&'static str),
}

pub type Result<T> = std::result::Result<T, GeofenceError>;

/// A WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self {
            latitude,
            longitude,
        };
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeofenceError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to another coordinate in meters
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_m(self, other)
    }

    /// Shareable map link for this position
    pub fn maps_link(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }
}

/// What kind of danger a zone represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneCategory {
    Crime,
    #[serde(alias = "natural")]
    NaturalHazard,
    Restricted,
}

/// Risk tier of a danger zone. Ordered so that `High` is the greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Low,
    Medium,
    High,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Map overlay fill color
    pub fn fill_color(&self) -> &'static str {
        match self {
            Self::High => "rgba(255,0,0,0.4)",
            Self::Medium => "rgba(255,165,0,0.4)",
            Self::Low => "rgba(0,128,0,0.4)",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A circular danger zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DangerZone {
    pub id: String,
    pub name: String,
    pub category: ZoneCategory,
    pub center: Coordinate,
    /// Radius in meters (positive)
    pub radius_m: f64,
    pub alert_level: AlertLevel,
}

impl DangerZone {
    /// Check the zone's center and radius
    pub fn validate(&self) -> Result<()> {
        if !self.center.is_valid() {
            return Err(GeofenceError::InvalidCoordinate {
                latitude: self.center.latitude,
                longitude: self.center.longitude,
            });
        }
        if !(self.radius_m.is_finite() && self.radius_m > 0.0) {
            return Err(GeofenceError::InvalidRadius(self.id.clone(), self.radius_m));
        }
        Ok(())
    }

    /// Distance from the zone center in meters
    pub fn distance_from(&self, point: &Coordinate) -> f64 {
        haversine_m(point, &self.center)
    }

    /// Boundary inclusive
    pub fn contains(&self, point: &Coordinate) -> bool {
        self.distance_from(point) <= self.radius_m
    }
}

/// Perceived safety of a tourist attraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Safe,
    Caution,
    Danger,
}

impl SafetyLevel {
    /// Map pin color
    pub fn pin_color(&self) -> &'static str {
        match self {
            Self::Safe => "green",
            Self::Caution => "orange",
            Self::Danger => "red",
        }
    }

    /// Indicator color used in attraction lists
    pub fn indicator_color(&self) -> &'static str {
        match self {
            Self::Safe => "#10B981",
            Self::Caution => "#F59E0B",
            Self::Danger => "#EF4444",
        }
    }
}

/// A point of interest shown alongside danger zones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub id: String,
    pub name: String,
    /// Free-form type label, e.g. "Monument"
    pub kind: String,
    pub location: Coordinate,
    /// Visitor rating (0-5)
    pub rating: f64,
    pub safety_level: SafetyLevel,
}

/// A zone that contains a point, with the distance to its center
#[derive(Debug, Clone, Serialize)]
pub struct ZoneMatch<'a> {
    pub zone: &'a DangerZone,
    pub distance_m: f64,
}

/// An attraction near a point
#[derive(Debug, Clone, Serialize)]
pub struct NearbyAttraction<'a> {
    pub attraction: &'a Attraction,
    pub distance_m: f64,
}

/// Haversine distance between two coordinates in meters
pub fn haversine_m(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1_rad = a.latitude * PI / 180.0;
    let lat2_rad = b.latitude * PI / 180.0;
    let dlat = (b.latitude - a.latitude) * PI / 180.0;
    let dlon = (b.longitude - a.longitude) * PI / 180.0;

    let h = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// First zone in list order that contains `point`
pub fn find_enclosing_zone<'a>(point: &Coordinate, zones: &'a [DangerZone]) -> Option<&'a DangerZone> {
    zones.iter().find(|zone| zone.contains(point))
}

/// Every zone containing `point`, most severe first.
///
/// Ties on alert level are broken by distance to the zone center, then by
/// position in `zones`.
pub fn enclosing_zones<'a>(point: &Coordinate, zones: &'a [DangerZone]) -> Vec<ZoneMatch<'a>> {
    let mut matches: Vec<(usize, ZoneMatch<'a>)> = zones
        .iter()
        .enumerate()
        .filter_map(|(i, zone)| {
            let distance_m = zone.distance_from(point);
            (distance_m <= zone.radius_m).then_some((i, ZoneMatch { zone, distance_m }))
        })
        .collect();

    matches.sort_by(|(ia, a), (ib, b)| {
        Reverse(a.zone.alert_level)
            .cmp(&Reverse(b.zone.alert_level))
            .then(a.distance_m.total_cmp(&b.distance_m))
            .then(ia.cmp(ib))
    });

    matches.into_iter().map(|(_, m)| m).collect()
}

/// The most severe (then nearest) zone containing `point`
pub fn most_severe_zone<'a>(point: &Coordinate, zones: &'a [DangerZone]) -> Option<ZoneMatch<'a>> {
    enclosing_zones(point, zones).into_iter().next()
}

/// Attractions within `within_m` meters of `point`, nearest first
pub fn nearby_attractions<'a>(
    point: &Coordinate,
    attractions: &'a [Attraction],
    within_m: f64,
) -> Vec<NearbyAttraction<'a>> {
    let mut nearby: Vec<NearbyAttraction<'a>> = attractions
        .iter()
        .map(|attraction| NearbyAttraction {
            attraction,
            distance_m: haversine_m(point, &attraction.location),
        })
        .filter(|n| n.distance_m <= within_m)
        .collect();

    nearby.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    nearby
}
