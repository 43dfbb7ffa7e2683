//! Gateway configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `SAFETY_GATEWAY_PORT` / `PORT` | 18700 |
//! | `SAFETY_ZONES_PATH` | built-in zones |
//! | `SAFETY_ATTRACTIONS_PATH` | built-in attractions |
//! | `WEATHERAPI_KEY` | mock weather |
//! | `SAFETY_HISTORY_DAYS` | 7 |
//! | `SAFETY_MAX_DEVICES` | 10000 |
//! | `SAFETY_DEVICE_TTL_SECS` | 21600 |

use safety_advisor::{DEFAULT_DEVICE_IDLE_TTL, DEFAULT_MAX_DEVICES};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use weather_risk::DEFAULT_HISTORY_DAYS;

pub const DEFAULT_PORT: u16 = 18700;

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub port: u16,
    pub zones_path: Option<PathBuf>,
    pub attractions_path: Option<PathBuf>,
    pub weatherapi_key: Option<String>,
    pub history_days: usize,
    pub max_devices: usize,
    /// Idle time after which a device's tracker is dropped
    pub device_ttl: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            zones_path: None,
            attractions_path: None,
            weatherapi_key: None,
            history_days: DEFAULT_HISTORY_DAYS,
            max_devices: DEFAULT_MAX_DEVICES,
            device_ttl: DEFAULT_DEVICE_IDLE_TTL,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("SAFETY_GATEWAY_PORT").or_else(|| non_empty("PORT")) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid port {:?}", raw);
                defaults.port
            }),
            None => defaults.port,
        };

        let history_days = match non_empty("SAFETY_HISTORY_DAYS") {
            Some(raw) => match raw.trim().parse() {
                Ok(days) if days > 0 => days,
                _ => {
                    warn!("Ignoring invalid history window {:?}", raw);
                    defaults.history_days
                }
            },
            None => defaults.history_days,
        };

        let max_devices = match non_empty("SAFETY_MAX_DEVICES") {
            Some(raw) => match raw.trim().parse() {
                Ok(max) if max > 0 => max,
                _ => {
                    warn!("Ignoring invalid device limit {:?}", raw);
                    defaults.max_devices
                }
            },
            None => defaults.max_devices,
        };

        let device_ttl = match non_empty("SAFETY_DEVICE_TTL_SECS") {
            Some(raw) => match raw.trim().parse() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!("Ignoring invalid device TTL {:?}", raw);
                    defaults.device_ttl
                }
            },
            None => defaults.device_ttl,
        };

        Self {
            port,
            zones_path: non_empty("SAFETY_ZONES_PATH").map(PathBuf::from),
            attractions_path: non_empty("SAFETY_ATTRACTIONS_PATH").map(PathBuf::from),
            weatherapi_key: non_empty("WEATHERAPI_KEY"),
            history_days,
            max_devices,
            device_ttl,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> GatewayConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]), GatewayConfig::default());
        assert_eq!(config(&[]).bind_addr(), "0.0.0.0:18700");
    }

    #[test]
    fn test_port_precedence() {
        assert_eq!(config(&[("PORT", "9000")]).port, 9000);
        assert_eq!(config(&[("PORT", "9000"), ("SAFETY_GATEWAY_PORT", "9100")]).port, 9100);
        assert_eq!(config(&[("SAFETY_GATEWAY_PORT", "not-a-port")]).port, DEFAULT_PORT);
    }

    #[test]
    fn test_paths_and_key() {
        let cfg = config(&[
            ("SAFETY_ZONES_PATH", "data/zones.json"),
            ("WEATHERAPI_KEY", "  "),
            ("SAFETY_HISTORY_DAYS", "0"),
        ]);
        assert_eq!(cfg.zones_path, Some(PathBuf::from("data/zones.json")));
        assert!(cfg.attractions_path.is_none());
        assert!(cfg.weatherapi_key.is_none());
        assert_eq!(cfg.history_days, DEFAULT_HISTORY_DAYS);
    }

    #[test]
    fn test_device_limits() {
        let cfg = config(&[("SAFETY_MAX_DEVICES", "500"), ("SAFETY_DEVICE_TTL_SECS", "60")]);
        assert_eq!(cfg.max_devices, 500);
        assert_eq!(cfg.device_ttl, Duration::from_secs(60));

        let cfg = config(&[("SAFETY_MAX_DEVICES", "0"), ("SAFETY_DEVICE_TTL_SECS", "soon")]);
        assert_eq!(cfg.max_devices, DEFAULT_MAX_DEVICES);
        assert_eq!(cfg.device_ttl, DEFAULT_DEVICE_IDLE_TTL);
    }
}
