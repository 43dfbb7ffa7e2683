//! Zone occupancy tracking
//!
//! Turns a stream of position fixes into entry/exit transitions so that a
//! caller alerts once per entry rather than on every fix inside a zone.

use crate::{Coordinate, DangerZone};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// A change in zone occupancy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ZoneEvent {
    Entered { zone: DangerZone, distance_m: f64 },
    Exited { zone: DangerZone },
}

impl ZoneEvent {
    pub fn zone(&self) -> &DangerZone {
        match self {
            Self::Entered { zone, .. } | Self::Exited { zone } => zone,
        }
    }

    pub fn is_entry(&self) -> bool {
        matches!(self, Self::Entered { .. })
    }

    /// User-facing warning text. Only entries produce one.
    pub fn advisory(&self) -> Option<String> {
        match self {
            Self::Entered { zone, .. } => Some(format!(
                "You are entering a {} risk area: {}. Please exercise caution.",
                zone.alert_level, zone.name
            )),
            Self::Exited { .. } => None,
        }
    }
}

/// Remembers which zones a single device currently occupies
#[derive(Debug, Clone, Default)]
pub struct ZoneTracker {
    occupied: HashSet<String>,
}

impl ZoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a new position; returns transitions in zone list order.
    ///
    /// Exits are reported before entries. A zone that vanished from `zones`
    /// since the last update is forgotten without an event.
    pub fn update(&mut self, point: &Coordinate, zones: &[DangerZone]) -> Vec<ZoneEvent> {
        let mut events = Vec::new();
        let mut entered = Vec::new();
        let mut now_inside: HashSet<String> = HashSet::with_capacity(self.occupied.len());
        let mut still_listed = 0usize;

        for zone in zones {
            let distance_m = zone.distance_from(point);
            let inside = distance_m <= zone.radius_m;
            let was_inside = self.occupied.contains(&zone.id);
            if was_inside {
                still_listed += 1;
            }

            if inside {
                now_inside.insert(zone.id.clone());
                if !was_inside {
                    entered.push(ZoneEvent::Entered {
                        zone: zone.clone(),
                        distance_m,
                    });
                }
            } else if was_inside {
                events.push(ZoneEvent::Exited { zone: zone.clone() });
            }
        }

        let removed = self.occupied.len().saturating_sub(still_listed);
        if removed > 0 {
            debug!("Dropping occupancy of {} removed zones", removed);
        }

        events.extend(entered);
        self.occupied = now_inside;

        for event in &events {
            debug!(
                "Zone {} {}",
                event.zone().id,
                if event.is_entry() { "entered" } else { "exited" }
            );
        }

        events
    }

    pub fn is_inside(&self, zone_id: &str) -> bool {
        self.occupied.contains(zone_id)
    }

    /// IDs of the zones currently occupied, sorted
    pub fn occupied(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.occupied.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn reset(&mut self) {
        self.occupied.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    fn at(lat: f64, lon: f64) -> Coordinate {
        Coordinate {
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn test_alerts_once_per_entry() {
        let zones = sample::danger_zones();
        let mut tracker = ZoneTracker::new();

        // Far away
        assert!(tracker.update(&at(28.50, 77.00), &zones).is_empty());

        // Walk into Old Delhi
        let events = tracker.update(&at(28.6562, 77.2410), &zones);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_entry());
        assert_eq!(events[0].zone().id, "old-delhi-crime");
        assert_eq!(
            events[0].advisory().unwrap(),
            "You are entering a high risk area: High Crime Area - Old Delhi. Please exercise caution."
        );

        // Still inside: no repeat
        assert!(tracker.update(&at(28.6565, 77.2412), &zones).is_empty());
        assert!(tracker.is_inside("old-delhi-crime"));

        // Leave
        let events = tracker.update(&at(28.50, 77.00), &zones);
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_entry());
        assert!(events[0].advisory().is_none());
        assert!(tracker.occupied().is_empty());

        // Re-entry alerts again
        let events = tracker.update(&at(28.6562, 77.2410), &zones);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_entry());
    }

    #[test]
    fn test_overlapping_zones_enter_together() {
        let zones = sample::danger_zones();
        let mut tracker = ZoneTracker::new();

        // Center of the small flood zone also lies inside the Yamuna zone
        let events = tracker.update(&at(28.62, 77.21), &zones);
        let ids: Vec<&str> = events.iter().map(|e| e.zone().id.as_str()).collect();
        assert_eq!(ids, vec!["yamuna-flood", "central-flood"]);
        assert_eq!(tracker.occupied(), vec!["central-flood", "yamuna-flood"]);
    }

    #[test]
    fn test_exit_reported_before_entry() {
        let zones = sample::danger_zones();
        let mut tracker = ZoneTracker::new();

        tracker.update(&at(28.6562, 77.2410), &zones);
        let events = tracker.update(&at(28.61, 77.22), &zones);

        assert!(!events[0].is_entry());
        assert_eq!(events[0].zone().id, "old-delhi-crime");
        assert!(events[1..].iter().all(ZoneEvent::is_entry));
        assert!(tracker.is_inside("central-crime"));
    }

    #[test]
    fn test_removed_zone_is_forgotten() {
        let mut zones = sample::danger_zones();
        let mut tracker = ZoneTracker::new();
        tracker.update(&at(28.6562, 77.2410), &zones);

        zones.retain(|z| z.id != "old-delhi-crime");
        assert!(tracker.update(&at(28.6562, 77.2410), &zones).is_empty());
        assert!(!tracker.is_inside("old-delhi-crime"));
    }

    #[test]
    fn test_reset() {
        let zones = sample::danger_zones();
        let mut tracker = ZoneTracker::new();
        tracker.update(&at(28.6562, 77.2410), &zones);
        tracker.reset();
        assert_eq!(tracker.update(&at(28.6562, 77.2410), &zones).len(), 1);
    }
}
