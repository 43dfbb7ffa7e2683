use anyhow::Result;
use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use safety_advisor::SafetyAdvisor;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather_risk::{MockWeatherProvider, WeatherApi, WeatherApiConfig};

mod config;
mod error;
mod routes;
mod weather_routes;

use config::GatewayConfig;
use weather_routes::WeatherSource;

#[derive(Clone)]
pub struct AppState {
    /// Zones, attractions and per-device trackers
    pub advisor: Arc<RwLock<SafetyAdvisor>>,
    pub weather: Arc<WeatherSource>,
}

impl AppState {
    pub fn new(advisor: SafetyAdvisor, weather: WeatherSource) -> Self {
        Self {
            advisor: Arc::new(RwLock::new(advisor)),
            weather: Arc::new(weather),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/zones", get(routes::list_zones))
        .route("/zones/overlay", get(routes::zone_overlay))
        .route("/attractions", get(routes::list_attractions))
        .route("/geofence/check", post(routes::check_geofence))
        .route("/geofence/devices/:device_id", delete(routes::forget_device))
        .route("/weather", get(weather_routes::get_weather))
        .route("/weather/classify", get(weather_routes::classify_temperature))
        .route("/weather/cache/clear", post(weather_routes::clear_cache))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "safety_gateway=debug,tower_http=info,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env();

    let advisor = SafetyAdvisor::from_files(config.zones_path.as_deref(), config.attractions_path.as_deref())?
        .with_history_days(config.history_days)
        .with_device_limits(config.max_devices, config.device_ttl);
    tracing::info!(
        "   Loaded {} danger zones, {} attractions",
        advisor.zones().len(),
        advisor.attractions().len()
    );

    let weather = match &config.weatherapi_key {
        Some(key) => WeatherSource::Live(WeatherApi::new(WeatherApiConfig::with_key(key.as_str()))?),
        None => {
            tracing::warn!("   WEATHERAPI_KEY not set - serving mock weather");
            WeatherSource::Mock(MockWeatherProvider::new())
        }
    };
    tracing::info!("   Weather source: {}", weather.name());

    let app = app(AppState::new(advisor, weather));

    let addr = config.bind_addr();
    tracing::info!("Safety Gateway starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "safety-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    pub fn test_state() -> AppState {
        AppState::new(
            SafetyAdvisor::with_samples(),
            WeatherSource::Mock(MockWeatherProvider::new()),
        )
    }

    pub fn test_app() -> Router {
        app(test_state())
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, body)
    }

    pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        call(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(
        app: Router,
        method: &str,
        uri: &str,
        body: &serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        call(app, request).await
    }
}
