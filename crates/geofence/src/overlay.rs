//! GeoJSON map overlay for danger zones and attractions

use crate::{Attraction, Coordinate, DangerZone, EARTH_RADIUS_M};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

/// Default vertex count when zones are drawn as polygons
pub const DEFAULT_RING_SEGMENTS: usize = 64;

/// How zones are represented in the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneShape {
    /// Center point with a `radius_m` property, for renderers with native circles
    Point,
    /// Closed polygon approximating the circle
    Polygon { segments: usize },
}

/// Point at `distance_m` along `bearing_deg` from `origin` on the sphere
pub fn destination(origin: &Coordinate, bearing_deg: f64, distance_m: f64) -> Coordinate {
    let phi1 = origin.latitude.to_radians();
    let lambda1 = origin.longitude.to_radians();
    let theta = bearing_deg.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;

    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    // Normalize longitude to [-180, 180)
    let lon = (lambda2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;

    Coordinate {
        latitude: phi2.to_degrees(),
        longitude: lon,
    }
}

/// Closed ring of `[lon, lat]` positions approximating a zone boundary
pub fn circle_ring(center: &Coordinate, radius_m: f64, segments: usize) -> Vec<Vec<f64>> {
    let segments = segments.max(3);
    let mut ring: Vec<Vec<f64>> = (0..segments)
        .map(|i| {
            let bearing = 360.0 * i as f64 / segments as f64;
            let p = destination(center, bearing, radius_m);
            vec![p.longitude, p.latitude]
        })
        .collect();
    ring.push(ring[0].clone());
    ring
}

fn properties(value: serde_json::Value) -> Option<JsonObject> {
    match value {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}

fn feature(geometry: Value, props: serde_json::Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: properties(props),
        foreign_members: None,
    }
}

pub fn zone_feature(zone: &DangerZone, shape: ZoneShape) -> Feature {
    let geometry = match shape {
        ZoneShape::Point => Value::Point(vec![zone.center.longitude, zone.center.latitude]),
        ZoneShape::Polygon { segments } => {
            Value::Polygon(vec![circle_ring(&zone.center, zone.radius_m, segments)])
        }
    };

    feature(
        geometry,
        json!({
            "kind": "danger_zone",
            "id": zone.id,
            "name": zone.name,
            "category": zone.category,
            "alert_level": zone.alert_level,
            "radius_m": zone.radius_m,
            "fill_color": zone.alert_level.fill_color(),
        }),
    )
}

pub fn attraction_feature(attraction: &Attraction) -> Feature {
    feature(
        Value::Point(vec![attraction.location.longitude, attraction.location.latitude]),
        json!({
            "kind": "attraction",
            "id": attraction.id,
            "name": attraction.name,
            "type": attraction.kind,
            "rating": attraction.rating,
            "safety_level": attraction.safety_level,
            "pin_color": attraction.safety_level.pin_color(),
        }),
    )
}

/// Export zones and attractions as one FeatureCollection
pub fn to_geojson(zones: &[DangerZone], attractions: &[Attraction], shape: ZoneShape) -> FeatureCollection {
    let features = zones
        .iter()
        .map(|z| zone_feature(z, shape))
        .chain(attractions.iter().map(attraction_feature))
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
