//! Safety Advisor
//!
//! Combines the geofence evaluator and the weather classifier into the
//! advisories a traveller actually sees:
//! - One danger zone advisory per zone entry, tracked per device
//! - A weather advisory from current conditions and recent history
//!
//! # Usage
//!
//! ```rust
//! use geofence::Coordinate;
//! use safety_advisor::SafetyAdvisor;
//!
//! let mut advisor = SafetyAdvisor::with_samples();
//! let inside = Coordinate { latitude: 28.62, longitude: 77.21 };
//!
//! assert!(!advisor.observe("phone-1", &inside).is_empty());
//! assert!(advisor.observe("phone-1", &inside).is_empty());
//! ```

use chrono::{DateTime, Utc};
use geofence::{loader, sample, AlertLevel, Attraction, Coordinate, DangerZone, ZoneEvent, ZoneTracker};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;
use weather_risk::{average_of_last_days, DailySummary, Severity, WeatherReading, DEFAULT_HISTORY_DAYS};

/// What an advisory is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    DangerZone,
    Weather,
}

/// A message to surface to the traveller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub id: Uuid,
    pub kind: AdvisoryKind,
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub issued_at: DateTime<Utc>,
    /// Zone that triggered a danger zone advisory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

impl Advisory {
    fn new(kind: AdvisoryKind, title: String, body: String, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title,
            body,
            severity,
            issued_at: Utc::now(),
            zone_id: None,
        }
    }

    /// Advisory for a zone entry; exits produce none
    pub fn from_zone_event(event: &ZoneEvent) -> Option<Self> {
        let body = event.advisory()?;
        let zone = event.zone();

        let mut advisory = Self::new(
            AdvisoryKind::DangerZone,
            format!("Danger zone: {}", zone.name),
            body,
            zone_severity(zone.alert_level),
        );
        advisory.zone_id = Some(zone.id.clone());
        Some(advisory)
    }

    /// Advisory for the current weather, compared against `historical_avg_c`
    pub fn from_weather(reading: &WeatherReading, historical_avg_c: Option<f64>) -> Self {
        let alert = reading.alert(historical_avg_c);
        Self::new(AdvisoryKind::Weather, alert.message, alert.recommendation, alert.severity)
    }
}

fn zone_severity(level: AlertLevel) -> Severity {
    match level {
        AlertLevel::High => Severity::High,
        AlertLevel::Medium => Severity::Medium,
        AlertLevel::Low => Severity::Low,
    }
}

/// Longest device id accepted from clients
pub const MAX_DEVICE_ID_LEN: usize = 128;

/// Tracked devices kept before the least recently seen is evicted
pub const DEFAULT_MAX_DEVICES: usize = 10_000;

/// Devices silent for this long are dropped (6 hours)
pub const DEFAULT_DEVICE_IDLE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, Clone)]
struct DeviceState {
    tracker: ZoneTracker,
    last_seen: Instant,
    /// Update order, for least-recently-seen eviction
    last_tick: u64,
}

/// Zones, attractions and per-device occupancy
#[derive(Debug, Clone)]
pub struct SafetyAdvisor {
    zones: Vec<DangerZone>,
    attractions: Vec<Attraction>,
    devices: HashMap<String, DeviceState>,
    tick: u64,
    max_devices: usize,
    idle_ttl: Duration,
    history_days: usize,
}

impl SafetyAdvisor {
    pub fn new(zones: Vec<DangerZone>, attractions: Vec<Attraction>) -> Self {
        Self {
            zones,
            attractions,
            devices: HashMap::new(),
            tick: 0,
            max_devices: DEFAULT_MAX_DEVICES,
            idle_ttl: DEFAULT_DEVICE_IDLE_TTL,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    /// Built-in New Delhi data
    pub fn with_samples() -> Self {
        Self::new(sample::danger_zones(), sample::attractions())
    }

    /// Load from JSON files, falling back to the built-in data for any path
    /// not given
    pub fn from_files(zones: Option<&Path>, attractions: Option<&Path>) -> geofence::Result<Self> {
        let zones = match zones {
            Some(path) => loader::load_zones(path)?,
            None => sample::danger_zones(),
        };
        let attractions = match attractions {
            Some(path) => loader::load_attractions(path)?,
            None => sample::attractions(),
        };

        info!("Advisor ready with {} zones, {} attractions", zones.len(), attractions.len());
        Ok(Self::new(zones, attractions))
    }

    /// Days of history averaged for weather comparison
    pub fn with_history_days(mut self, days: usize) -> Self {
        self.history_days = days;
        self
    }

    /// Bound the number of tracked devices and how long an idle one is kept.
    /// A limit of 0 is treated as 1.
    pub fn with_device_limits(mut self, max_devices: usize, idle_ttl: Duration) -> Self {
        self.max_devices = max_devices.max(1);
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn zones(&self) -> &[DangerZone] {
        &self.zones
    }

    pub fn attractions(&self) -> &[Attraction] {
        &self.attractions
    }

    pub fn history_days(&self) -> usize {
        self.history_days
    }

    /// Feed a device's position; returns its occupancy transitions.
    ///
    /// A device seen for the first time may evict idle devices, then the
    /// least recently seen ones while at capacity.
    pub fn track(&mut self, device_id: &str, point: &Coordinate) -> Vec<ZoneEvent> {
        let now = Instant::now();
        if !self.devices.contains_key(device_id) {
            self.evict_for_new_device(now);
        }

        self.tick += 1;
        let state = self
            .devices
            .entry(device_id.to_string())
            .or_insert_with(|| DeviceState {
                tracker: ZoneTracker::new(),
                last_seen: now,
                last_tick: 0,
            });
        state.last_seen = now;
        state.last_tick = self.tick;

        let events = state.tracker.update(point, &self.zones);
        if !events.is_empty() {
            debug!("{}: {} zone transitions", device_id, events.len());
        }
        events
    }

    /// Feed a device's position; returns advisories for newly entered zones
    pub fn observe(&mut self, device_id: &str, point: &Coordinate) -> Vec<Advisory> {
        self.track(device_id, point)
            .iter()
            .filter_map(Advisory::from_zone_event)
            .collect()
    }

    fn evict_for_new_device(&mut self, now: Instant) {
        let before = self.devices.len();
        let ttl = self.idle_ttl;
        self.devices
            .retain(|_, state| now.saturating_duration_since(state.last_seen) < ttl);

        while self.devices.len() >= self.max_devices {
            let oldest = self
                .devices
                .iter()
                .min_by_key(|(_, state)| state.last_tick)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    self.devices.remove(&id);
                }
                None => break,
            }
        }

        let evicted = before - self.devices.len();
        if evicted > 0 {
            debug!("Evicted {} device trackers", evicted);
        }
    }

    /// Stop tracking a device. Returns whether it was tracked.
    pub fn forget_device(&mut self, device_id: &str) -> bool {
        self.devices.remove(device_id).is_some()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Zone IDs the device currently occupies
    pub fn occupied_zones(&self, device_id: &str) -> Vec<&str> {
        self.devices
            .get(device_id)
            .map(|state| state.tracker.occupied())
            .unwrap_or_default()
    }

    /// Weather advisory using the configured history window
    pub fn weather_advisory(&self, reading: &WeatherReading, history: &[DailySummary]) -> Advisory {
        let avg = average_of_last_days(history, self.history_days);
        Advisory::from_weather(reading, avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn at(lat: f64, lon: f64) -> Coordinate {
        Coordinate {
            latitude: lat,
            longitude: lon,
        }
    }

    fn reading(temp_c: f64) -> WeatherReading {
        WeatherReading {
            temp_c,
            feels_like_c: temp_c,
            humidity_pct: 50.0,
            wind_kph: 8.0,
            condition: "Clear".to_string(),
            location_name: None,
            observed_at: Utc::now(),
        }
    }

    fn history(avgs: &[f64]) -> Vec<DailySummary> {
        let today = Utc::now().date_naive();
        avgs.iter()
            .enumerate()
            .map(|(i, avg)| DailySummary {
                date: today - Duration::days((avgs.len() - i) as i64),
                max_temp_c: avg + 5.0,
                min_temp_c: avg - 5.0,
                avg_temp_c: *avg,
                condition: "Clear".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_zone_advisory_on_entry_only() {
        let mut advisor = SafetyAdvisor::with_samples();
        let inside = at(28.62, 77.21);
        let outside = at(28.5, 77.0);

        let first = advisor.observe("phone-1", &inside);
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|a| a.kind == AdvisoryKind::DangerZone));
        assert!(first
            .iter()
            .any(|a| a.body == "You are entering a high risk area: Flood Zone. Please exercise caution."));

        assert!(advisor.observe("phone-1", &inside).is_empty());
        assert!(advisor.observe("phone-1", &outside).is_empty());
        assert_eq!(advisor.observe("phone-1", &inside).len(), 2);
    }

    #[test]
    fn test_devices_tracked_independently() {
        let mut advisor = SafetyAdvisor::with_samples();
        let inside = at(28.62, 77.21);

        assert!(!advisor.observe("phone-1", &inside).is_empty());
        assert!(!advisor.observe("phone-2", &inside).is_empty());
        assert_eq!(advisor.device_count(), 2);
        assert_eq!(advisor.occupied_zones("phone-1"), vec!["central-flood", "yamuna-flood"]);

        assert!(advisor.forget_device("phone-1"));
        assert!(!advisor.forget_device("phone-1"));
        assert!(advisor.occupied_zones("phone-1").is_empty());
        assert!(!advisor.observe("phone-1", &inside).is_empty());
    }

    #[test]
    fn test_least_recently_seen_device_evicted_at_capacity() {
        let mut advisor = SafetyAdvisor::with_samples().with_device_limits(2, DEFAULT_DEVICE_IDLE_TTL);
        let inside = at(28.62, 77.21);

        advisor.observe("phone-1", &inside);
        advisor.observe("phone-2", &inside);
        // phone-1 becomes the most recent
        advisor.observe("phone-1", &inside);
        advisor.observe("phone-3", &inside);

        assert_eq!(advisor.device_count(), 2);
        assert!(advisor.occupied_zones("phone-2").is_empty());
        assert!(!advisor.occupied_zones("phone-1").is_empty());
        assert!(!advisor.occupied_zones("phone-3").is_empty());

        // Known devices never trigger eviction
        advisor.observe("phone-3", &inside);
        assert_eq!(advisor.device_count(), 2);
    }

    #[test]
    fn test_idle_devices_evicted() {
        let mut advisor = SafetyAdvisor::with_samples().with_device_limits(100, std::time::Duration::ZERO);
        let inside = at(28.62, 77.21);

        advisor.observe("phone-1", &inside);
        advisor.observe("phone-2", &inside);

        assert_eq!(advisor.device_count(), 1);
        assert!(advisor.occupied_zones("phone-1").is_empty());
        // An evicted device starts over and is alerted again
        assert!(!advisor.observe("phone-1", &inside).is_empty());
    }

    #[test]
    fn test_zone_severity_follows_alert_level() {
        let mut advisor = SafetyAdvisor::with_samples();
        let advisories = advisor.observe("phone-1", &at(28.62, 77.21));

        let flood = advisories
            .iter()
            .find(|a| a.zone_id.as_deref() == Some("central-flood"))
            .unwrap();
        assert_eq!(flood.severity, Severity::High);

        let yamuna = advisories
            .iter()
            .find(|a| a.zone_id.as_deref() == Some("yamuna-flood"))
            .unwrap();
        assert_eq!(yamuna.severity, Severity::Medium);
        assert_ne!(flood.id, yamuna.id);
    }

    #[test]
    fn test_weather_advisory_with_history() {
        let advisor = SafetyAdvisor::with_samples();

        let advisory = advisor.weather_advisory(&reading(20.0), &history(&[10.0, 10.0, 10.0]));
        assert_eq!(advisory.kind, AdvisoryKind::Weather);
        assert_eq!(advisory.severity, Severity::Low);
        assert!(advisory.title.contains("warmer than usual"));
        assert!(advisory.zone_id.is_none());
    }

    #[test]
    fn test_weather_advisory_without_history() {
        let advisor = SafetyAdvisor::with_samples();

        let advisory = advisor.weather_advisory(&reading(20.0), &[]);
        assert_eq!(advisory.title, "Comfortable Temperature: 20°C");

        let hot = advisor.weather_advisory(&reading(41.0), &[]);
        assert_eq!(hot.severity, Severity::Extreme);
        assert!(hot.body.contains("heat stroke"));
    }

    #[test]
    fn test_history_window_uses_recent_days() {
        let advisor = SafetyAdvisor::with_samples().with_history_days(2);
        // Oldest day would pull the average down to "warmer than usual"
        let advisory = advisor.weather_advisory(&reading(20.0), &history(&[-30.0, 19.0, 21.0]));
        assert!(advisory.title.ends_with("(normal)"));
    }

    #[test]
    fn test_from_files_with_fallback() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"zones": [{{"id": "z1", "name": "Market", "type": "crime", "latitude": 10.0, "longitude": 20.0, "radius": 250, "alertLevel": "low"}}]}}"#
        )
        .unwrap();

        let advisor = SafetyAdvisor::from_files(Some(file.path()), None).unwrap();
        assert_eq!(advisor.zones().len(), 1);
        assert_eq!(advisor.attractions().len(), sample::attractions().len());
    }

    #[test]
    fn test_advisory_serialization() {
        let mut advisor = SafetyAdvisor::with_samples();
        let advisory = advisor.observe("phone-1", &at(28.62, 77.21)).remove(0);

        let json = serde_json::to_value(&advisory).unwrap();
        assert_eq!(json["kind"], "danger_zone");
        assert!(json["severity"].is_string());
        assert!(json["zone_id"].is_string());
    }
}
