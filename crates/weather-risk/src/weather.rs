//! Weather readings and providers

use crate::{classify, DailySummary, WeatherAlert};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Temperature (Celsius)
    pub temp_c: f64,
    /// Apparent temperature (Celsius)
    pub feels_like_c: f64,
    /// Humidity (0-100)
    pub humidity_pct: f64,
    /// Wind speed (km/h)
    pub wind_kph: f64,
    /// Condition description, e.g. "Partly cloudy"
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl WeatherReading {
    /// Classify this reading's temperature
    pub fn alert(&self, historical_avg_c: Option<f64>) -> WeatherAlert {
        classify(self.temp_c, historical_avg_c)
    }
}

/// Weather data provider interface
pub trait WeatherProvider: Send + Sync {
    /// Get current weather for a location
    fn current(&self, lat: f64, lon: f64) -> Option<WeatherReading>;

    /// Get the last `days` days of daily summaries, oldest first
    fn history(&self, lat: f64, lon: f64, days: usize) -> Vec<DailySummary>;
}

/// Deterministic provider for demos and tests.
///
/// Temperature falls off with latitude: ~32°C at the equator, ~-13°C at
/// the poles.
#[derive(Debug, Clone, Default)]
pub struct MockWeatherProvider;

impl MockWeatherProvider {
    pub fn new() -> Self {
        Self
    }

    fn base_temp(lat: f64) -> f64 {
        32.0 - lat.abs() * 0.5
    }

    /// Generate a reading based on latitude
    pub fn generate_for_location(&self, lat: f64, lon: f64) -> WeatherReading {
        let temp_c = Self::base_temp(lat);
        // Vary with longitude to simulate local conditions
        let local = (lon.to_radians().sin() + 1.0) / 2.0;
        let humidity_pct = 40.0 + local * 40.0;

        WeatherReading {
            temp_c,
            feels_like_c: temp_c + (humidity_pct - 50.0) * 0.05,
            humidity_pct,
            wind_kph: 5.0 + local * 15.0,
            condition: if humidity_pct > 70.0 { "Overcast" } else { "Partly cloudy" }.to_string(),
            location_name: None,
            observed_at: Utc::now(),
        }
    }
}

impl WeatherProvider for MockWeatherProvider {
    fn current(&self, lat: f64, lon: f64) -> Option<WeatherReading> {
        Some(self.generate_for_location(lat, lon))
    }

    fn history(&self, lat: f64, _lon: f64, days: usize) -> Vec<DailySummary> {
        let today = Utc::now().date_naive();
        let base = Self::base_temp(lat);

        (1..=days)
            .rev()
            .map(|ago| {
                // Alternate a degree either side of the base
                let avg = base + if ago % 2 == 0 { 1.0 } else { -1.0 };
                DailySummary {
                    date: today - Duration::days(ago as i64),
                    max_temp_c: avg + 5.0,
                    min_temp_c: avg - 5.0,
                    avg_temp_c: avg,
                    condition: "Clear".to_string(),
                }
            })
            .collect()
    }
}
