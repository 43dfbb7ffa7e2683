//! Weather Risk Classification
//!
//! Classifies the current temperature into a risk band and produces the
//! advisory shown on the weather safety card:
//! - Fixed temperature bands (extreme heat, heat, normal, cold, extreme cold)
//! - Historical comparison against a recent daily-average window
//! - Card styling derived from kind and severity
//!
//! Live data comes from weatherapi.com when the `weather-api` feature is
//! enabled; the classifier itself is pure.
//!
//! # Usage
//!
//! ```rust
//! use weather_risk::{classify, historical_average, AlertKind};
//!
//! let avg = historical_average(&[10.0, 12.0, 11.0]);
//! let alert = classify(20.0, avg);
//! assert_eq!(alert.kind, AlertKind::Normal);
//! assert!(alert.message.contains("warmer than usual"));
//! ```

use thiserror::Error;

pub mod classify;
pub mod history;
pub mod payload;
pub mod weather;

#[cfg(feature = "weather-api")]
pub mod weather_api;

pub use classify::{
    classify, classify_with, AlertKind, Severity, TemperatureThresholds, TemperatureTrend,
    WeatherAlert, COLD_THRESHOLD_C, EXTREME_COLD_C, EXTREME_HOT_C, HOT_THRESHOLD_C,
    TREND_MARGIN_C,
};
pub use history::{average_of_last_days, historical_average, DailySummary, DEFAULT_HISTORY_DAYS};
pub use weather::{MockWeatherProvider, WeatherProvider, WeatherReading};

#[cfg(feature = "weather-api")]
pub use weather_api::{WeatherApi, WeatherApiConfig};

/// Weather data errors
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("No API key configured")]
    MissingApiKey,
    #[error("Invalid date in payload: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, WeatherError>;
