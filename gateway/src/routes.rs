//! Zone, attraction and geofence routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use geofence::overlay::{self, ZoneShape, DEFAULT_RING_SEGMENTS};
use geofence::{
    enclosing_zones, find_enclosing_zone, nearby_attractions, Attraction, Coordinate, DangerZone,
    ZoneEvent, DEFAULT_ATTRACTION_RADIUS_M,
};
use geojson::FeatureCollection;
use safety_advisor::{Advisory, MAX_DEVICE_ID_LEN};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

#[derive(Deserialize)]
pub struct OverlayQuery {
    /// "point" (default) or "polygon"
    pub shape: Option<String>,
    pub segments: Option<usize>,
}

#[derive(Deserialize)]
pub struct AttractionQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub within_m: Option<f64>,
}

#[derive(Serialize)]
pub struct AttractionInfo {
    #[serde(flatten)]
    pub attraction: Attraction,
    pub pin_color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
}

#[derive(Deserialize)]
pub struct GeofenceCheckRequest {
    pub device_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize)]
pub struct ZoneMatchInfo {
    pub zone: DangerZone,
    pub distance_m: f64,
}

#[derive(Serialize)]
pub struct GeofenceCheckResponse {
    pub device_id: String,
    pub location: Coordinate,
    pub maps_link: String,
    /// First zone in list order containing the location
    pub enclosing: Option<DangerZone>,
    /// Every containing zone, most severe first
    pub matches: Vec<ZoneMatchInfo>,
    pub events: Vec<ZoneEvent>,
    pub advisories: Vec<Advisory>,
}

pub async fn list_zones(State(state): State<AppState>) -> Json<Vec<DangerZone>> {
    let advisor = state.advisor.read().await;
    Json(advisor.zones().to_vec())
}

pub async fn zone_overlay(
    State(state): State<AppState>,
    Query(query): Query<OverlayQuery>,
) -> Result<Json<FeatureCollection>, ApiError> {
    let shape = match query.shape.as_deref() {
        None | Some("point") => ZoneShape::Point,
        Some("polygon") => ZoneShape::Polygon {
            segments: query.segments.unwrap_or(DEFAULT_RING_SEGMENTS).clamp(8, 360),
        },
        Some(other) => {
            return Err(ApiError::BadRequest(format!("Unknown overlay shape: {}", other)));
        }
    };

    let advisor = state.advisor.read().await;
    Ok(Json(overlay::to_geojson(advisor.zones(), advisor.attractions(), shape)))
}

pub async fn list_attractions(
    State(state): State<AppState>,
    Query(query): Query<AttractionQuery>,
) -> Result<Json<Vec<AttractionInfo>>, ApiError> {
    let advisor = state.advisor.read().await;

    let attractions = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => {
            let point = Coordinate::new(lat, lon)?;
            let within_m = query.within_m.unwrap_or(DEFAULT_ATTRACTION_RADIUS_M);
            if !(within_m.is_finite() && within_m >= 0.0) {
                return Err(ApiError::BadRequest(format!("Invalid radius: {}", within_m)));
            }

            nearby_attractions(&point, advisor.attractions(), within_m)
                .into_iter()
                .map(|n| AttractionInfo {
                    attraction: n.attraction.clone(),
                    pin_color: n.attraction.safety_level.pin_color(),
                    distance_m: Some(n.distance_m),
                })
                .collect()
        }
        (None, None) => advisor
            .attractions()
            .iter()
            .map(|a| AttractionInfo {
                attraction: a.clone(),
                pin_color: a.safety_level.pin_color(),
                distance_m: None,
            })
            .collect(),
        _ => {
            return Err(ApiError::BadRequest("lat and lon must be given together".to_string()));
        }
    };

    Ok(Json(attractions))
}

/// Record a device position and report zone transitions
pub async fn check_geofence(
    State(state): State<AppState>,
    Json(req): Json<GeofenceCheckRequest>,
) -> Result<Json<GeofenceCheckResponse>, ApiError> {
    let device_id = req.device_id.trim();
    if device_id.is_empty() {
        return Err(ApiError::BadRequest("device_id is required".to_string()));
    }
    if device_id.chars().count() > MAX_DEVICE_ID_LEN {
        return Err(ApiError::BadRequest(format!(
            "device_id longer than {} characters",
            MAX_DEVICE_ID_LEN
        )));
    }
    let point = Coordinate::new(req.latitude, req.longitude)?;

    let mut advisor = state.advisor.write().await;
    let events = advisor.track(device_id, &point);
    let advisories: Vec<Advisory> = events.iter().filter_map(Advisory::from_zone_event).collect();

    for advisory in &advisories {
        tracing::info!("{}: {}", device_id, advisory.body);
    }

    let enclosing = find_enclosing_zone(&point, advisor.zones()).cloned();
    let matches = enclosing_zones(&point, advisor.zones())
        .into_iter()
        .map(|m| ZoneMatchInfo {
            zone: m.zone.clone(),
            distance_m: m.distance_m,
        })
        .collect();

    Ok(Json(GeofenceCheckResponse {
        device_id: device_id.to_string(),
        location: point,
        maps_link: point.maps_link(),
        enclosing,
        matches,
        events,
        advisories,
    }))
}

/// Stop tracking a device
pub async fn forget_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut advisor = state.advisor.write().await;
    if advisor.forget_device(&device_id) {
        Ok(Json(serde_json::json!({ "device_id": device_id, "forgotten": true })))
    } else {
        Err(ApiError::NotFound(format!("Device not tracked: {}", device_id)))
    }
}
