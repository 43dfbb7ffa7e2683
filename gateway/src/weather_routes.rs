//! Weather classification routes
//!
//! Uses weatherapi.com when `WEATHERAPI_KEY` is set, otherwise the
//! deterministic mock provider. An upstream failure is reported as 502 and
//! nothing is classified.

use axum::{
    extract::{Query, State},
    Json,
};
use geofence::Coordinate;
use safety_advisor::Advisory;
use serde::{Deserialize, Serialize};
use weather_risk::{
    average_of_last_days, classify, DailySummary, MockWeatherProvider, WeatherAlert, WeatherApi,
    WeatherProvider, WeatherReading,
};

use crate::error::ApiError;
use crate::AppState;

/// Longest history window a request may ask for
pub const MAX_HISTORY_DAYS: usize = 30;

/// Where current conditions come from
pub enum WeatherSource {
    Live(WeatherApi),
    Mock(MockWeatherProvider),
}

impl WeatherSource {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Live(_) => "weatherapi",
            Self::Mock(_) => "mock",
        }
    }

    async fn conditions(
        &self,
        point: &Coordinate,
        days: usize,
    ) -> Result<(WeatherReading, Vec<DailySummary>), ApiError> {
        match self {
            Self::Live(api) => Ok(api
                .fetch_conditions(point.latitude, point.longitude, days as u32)
                .await?),
            Self::Mock(provider) => {
                let reading = provider
                    .current(point.latitude, point.longitude)
                    .ok_or_else(|| ApiError::NotFound("No weather data for location".to_string()))?;
                Ok((reading, provider.history(point.latitude, point.longitude, days)))
            }
        }
    }
}

#[derive(Deserialize)]
pub struct ClassifyQuery {
    pub temp_c: f64,
    pub historical_avg_c: Option<f64>,
}

/// Card styling derived from the alert
#[derive(Serialize)]
pub struct CardStyle {
    pub background_color: &'static str,
    pub border_color: String,
    pub border_width: u8,
    pub safety_alert_active: bool,
}

impl From<&WeatherAlert> for CardStyle {
    fn from(alert: &WeatherAlert) -> Self {
        Self {
            background_color: alert.background_color(),
            border_color: alert.border_color().to_string(),
            border_width: alert.border_width(),
            safety_alert_active: alert.is_safety_alert_active(),
        }
    }
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    pub alert: WeatherAlert,
    pub card: CardStyle,
}

#[derive(Deserialize)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
    pub days: Option<usize>,
}

#[derive(Serialize)]
pub struct WeatherResponse {
    pub source: &'static str,
    pub location: Coordinate,
    pub reading: WeatherReading,
    pub history_days: usize,
    pub historical_avg_c: Option<f64>,
    pub alert: WeatherAlert,
    pub card: CardStyle,
    pub advisory: Advisory,
}

/// Classify a temperature supplied by the client
pub async fn classify_temperature(
    Query(query): Query<ClassifyQuery>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    if !query.temp_c.is_finite() {
        return Err(ApiError::BadRequest("temp_c must be a finite number".to_string()));
    }
    if query.historical_avg_c.is_some_and(|avg| !avg.is_finite()) {
        return Err(ApiError::BadRequest(
            "historical_avg_c must be a finite number".to_string(),
        ));
    }

    let alert = classify(query.temp_c, query.historical_avg_c);
    let card = CardStyle::from(&alert);
    Ok(Json(ClassifyResponse { alert, card }))
}

/// Fetch current weather and history for a location, then classify
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherResponse>, ApiError> {
    let point = Coordinate::new(query.lat, query.lon)?;

    let default_days = state.advisor.read().await.history_days();
    let days = query.days.unwrap_or(default_days).clamp(1, MAX_HISTORY_DAYS);

    let (reading, history) = state.weather.conditions(&point, days).await?;
    if !reading.temp_c.is_finite() {
        return Err(ApiError::Upstream(weather_risk::WeatherError::RequestFailed(
            "upstream returned a non-numeric temperature".to_string(),
        )));
    }

    let historical_avg_c = average_of_last_days(&history, days);
    let alert = reading.alert(historical_avg_c);
    let advisory = Advisory::from_weather(&reading, historical_avg_c);

    tracing::debug!(
        "Weather at {:.4},{:.4}: {} ({} days history)",
        point.latitude,
        point.longitude,
        alert.message,
        history.len()
    );

    Ok(Json(WeatherResponse {
        source: state.weather.name(),
        location: point,
        card: CardStyle::from(&alert),
        history_days: history.len(),
        historical_avg_c,
        reading,
        alert,
        advisory,
    }))
}

/// Drop cached live readings
pub async fn clear_cache(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cleared = match state.weather.as_ref() {
        WeatherSource::Live(api) => {
            let (total, _) = api.cache_stats().await;
            api.clear_cache().await;
            total
        }
        WeatherSource::Mock(_) => 0,
    };

    Json(serde_json::json!({
        "source": state.weather.name(),
        "cleared_entries": cleared,
    }))
}
