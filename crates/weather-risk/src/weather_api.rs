//! Live weather from weatherapi.com
//!
//! Fetches current conditions and day-by-day history for a coordinate and
//! caches current readings for a short TTL. A failed fetch is returned as an
//! error so the caller can skip classification.
//!
//! # Usage
//!
//! ```rust,ignore
//! let api = WeatherApi::new(WeatherApiConfig::with_key("..."))?;
//! let reading = api.fetch_current(28.6139, 77.2090).await?;
//! let history = api.fetch_history(28.6139, 77.2090, 7).await?;
//! let avg = average_of_last_days(&history, 7);
//! let alert = reading.alert(avg);
//! ```

use crate::payload::{parse_current, parse_history};
use crate::{
    average_of_last_days, DailySummary, Result, WeatherAlert, WeatherError, WeatherReading,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Weather API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherApiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Cache TTL in seconds (default: 300 = 5 minutes)
    pub cache_ttl_sec: u64,
    /// Request timeout in seconds
    pub timeout_sec: u64,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.weatherapi.com/v1".to_string(),
            cache_ttl_sec: 300,
            timeout_sec: 10,
        }
    }
}

impl WeatherApiConfig {
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

/// Cache entry with expiry
struct CacheEntry {
    reading: WeatherReading,
    expires_at: Instant,
}

/// Live weather client
pub struct WeatherApi {
    config: WeatherApiConfig,
    client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl WeatherApi {
    pub fn new(config: WeatherApiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(WeatherError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| WeatherError::RequestFailed(e.to_string()))?;

        Ok(Self {
            config,
            client,
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Cache key from coordinates (rounded to 2 decimal places)
    fn cache_key(lat: f64, lon: f64) -> String {
        format!("{:.2},{:.2}", lat, lon)
    }

    async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}/{}", self.config.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| WeatherError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            warn!("{} returned {}", endpoint, status);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }

    /// Fetch current weather for a location
    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Result<WeatherReading> {
        let key = Self::cache_key(lat, lon);

        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&key) {
                if entry.expires_at > Instant::now() {
                    debug!("Weather cache hit for {}", key);
                    return Ok(entry.reading.clone());
                }
            }
        }

        let body = self
            .get(
                "current.json",
                &[("q", format!("{},{}", lat, lon)), ("aqi", "no".to_string())],
            )
            .await?;
        let reading = parse_current(&body)?;

        {
            let mut cache = self.cache.write().await;
            cache.insert(
                key,
                CacheEntry {
                    reading: reading.clone(),
                    expires_at: Instant::now()
                        + std::time::Duration::from_secs(self.config.cache_ttl_sec),
                },
            );
        }

        Ok(reading)
    }

    /// Fetch daily summaries for the last `days` days
    pub async fn fetch_history(&self, lat: f64, lon: f64, days: u32) -> Result<Vec<DailySummary>> {
        let end_date = Utc::now().date_naive();
        let start_date = end_date - Duration::days(i64::from(days));

        let body = self
            .get(
                "history.json",
                &[
                    ("q", format!("{},{}", lat, lon)),
                    ("dt", start_date.format("%Y-%m-%d").to_string()),
                    ("end_dt", end_date.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;

        parse_history(&body)
    }

    /// Fetch current conditions and history concurrently.
    ///
    /// A history failure degrades to an empty history so the reading can
    /// still be classified without comparison; a current-conditions failure
    /// is returned.
    pub async fn fetch_conditions(
        &self,
        lat: f64,
        lon: f64,
        days: u32,
    ) -> Result<(WeatherReading, Vec<DailySummary>)> {
        let (current, history) =
            futures::join!(self.fetch_current(lat, lon), self.fetch_history(lat, lon, days));

        let reading = current?;
        let history = history.unwrap_or_else(|e| {
            warn!("Historical weather unavailable: {}", e);
            Vec::new()
        });

        Ok((reading, history))
    }

    /// Fetch and classify against the average of the last `days` days
    pub async fn fetch_alert(&self, lat: f64, lon: f64, days: u32) -> Result<WeatherAlert> {
        let (reading, history) = self.fetch_conditions(lat, lon, days).await?;
        Ok(reading.alert(average_of_last_days(&history, days as usize)))
    }

    /// Clear the cache
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    /// (total, unexpired) cache entries
    pub async fn cache_stats(&self) -> (usize, usize) {
        let cache = self.cache.read().await;
        let now = Instant::now();
        let valid = cache.values().filter(|e| e.expires_at > now).count();
        (cache.len(), valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        assert!(matches!(
            WeatherApi::new(WeatherApiConfig::default()),
            Err(WeatherError::MissingApiKey)
        ));
    }

    #[test]
    fn test_cache_key_rounding() {
        assert_eq!(WeatherApi::cache_key(28.61391, 77.20902), "28.61,77.21");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_error() {
        let api = WeatherApi::new(WeatherApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_sec: 2,
            ..WeatherApiConfig::with_key("test")
        })
        .unwrap();

        let result = api.fetch_current(28.6, 77.2).await;
        assert!(matches!(result, Err(WeatherError::RequestFailed(_))));
        assert!(api.fetch_alert(28.6, 77.2, 7).await.is_err());

        let (total, _) = api.cache_stats().await;
        assert_eq!(total, 0);
    }
}
