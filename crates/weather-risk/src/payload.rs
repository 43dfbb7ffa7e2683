//! weatherapi.com JSON payloads
//!
//! `current.json` and `history.json` responses, converted into
//! [`WeatherReading`] and [`DailySummary`].

use crate::{DailySummary, Result, WeatherError, WeatherReading};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temp_c: f64,
    condition: Condition,
    #[serde(default)]
    humidity: f64,
    #[serde(default)]
    wind_kph: f64,
    feelslike_c: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LocationBlock {
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentBlock,
    location: Option<LocationBlock>,
}

#[derive(Debug, Deserialize)]
struct DayBlock {
    maxtemp_c: f64,
    mintemp_c: f64,
    avgtemp_c: f64,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: String,
    day: DayBlock,
}

#[derive(Debug, Default, Deserialize)]
struct Forecast {
    #[serde(default)]
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    forecast: Forecast,
}

/// Parse a `current.json` response body
pub fn parse_current(body: &str) -> Result<WeatherReading> {
    let data: CurrentResponse = serde_json::from_str(body)?;

    let location_name = data.location.map(|l| {
        [l.name, l.region, l.country]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    });

    Ok(WeatherReading {
        temp_c: data.current.temp_c,
        feels_like_c: data.current.feelslike_c.unwrap_or(data.current.temp_c),
        humidity_pct: data.current.humidity,
        wind_kph: data.current.wind_kph,
        condition: data.current.condition.text,
        location_name,
        observed_at: Utc::now(),
    })
}

/// Parse a `history.json` response body. A missing forecast block is an
/// empty history.
pub fn parse_history(body: &str) -> Result<Vec<DailySummary>> {
    let data: HistoryResponse = serde_json::from_str(body)?;

    data.forecast
        .forecastday
        .into_iter()
        .map(|fd| {
            let date = NaiveDate::parse_from_str(&fd.date, "%Y-%m-%d")
                .map_err(|_| WeatherError::InvalidDate(fd.date.clone()))?;
            Ok(DailySummary {
                date,
                max_temp_c: fd.day.maxtemp_c,
                min_temp_c: fd.day.mintemp_c,
                avg_temp_c: fd.day.avgtemp_c,
                condition: fd.day.condition.text,
            })
        })
        .collect()
}
