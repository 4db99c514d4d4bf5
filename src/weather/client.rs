//! HTTP client for the weatherapi.com REST API

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::models::Coordinates;
use crate::{HaikuError, Result};

const NOT_CONFIGURED: &str = "No weather API key configured.";

/// Weather provider client. Cheap to clone.
#[derive(Clone)]
pub struct WeatherApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherApiClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("Haiku/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HaikuError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fails with `ConfigurationMissing` when no credential is set.
    pub fn ensure_configured(&self) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(HaikuError::configuration_missing(NOT_CONFIGURED))
        }
    }

    /// Current conditions, `current.json`
    pub async fn current(&self, coords: Coordinates) -> Result<Value> {
        self.get_json("current.json", coords, "").await
    }

    /// Hourly forecast for the given number of days, `forecast.json`
    pub async fn forecast(&self, coords: Coordinates, days: u8) -> Result<Value> {
        self.get_json("forecast.json", coords, &format!("&days={days}"))
            .await
    }

    #[instrument(skip(self, extra), fields(lat = coords.latitude, lon = coords.longitude))]
    async fn get_json(&self, endpoint: &str, coords: Coordinates, extra: &str) -> Result<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| HaikuError::configuration_missing(NOT_CONFIGURED))?;

        let url = format!(
            "{}/{}?key={}&q={}{}",
            self.base_url,
            endpoint,
            urlencoding::encode(api_key),
            urlencoding::encode(&coords.to_query()),
            extra
        );
        debug!("Requesting {}/{} for {}", self.base_url, endpoint, coords.to_query());

        let start_time = Instant::now();
        let response = self.client.get(&url).send().await.map_err(|e| {
            let e = e.without_url();
            warn!("Weather API request to {} failed: {}", endpoint, e);
            HaikuError::upstream(format!("Weather API request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = provider_error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            warn!("Weather API returned {} for {}: {}", status, endpoint, detail);
            return Err(HaikuError::upstream(format!(
                "Weather API error {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let payload: Value = response.json().await.map_err(|e| {
            HaikuError::upstream(format!(
                "Invalid JSON from weather API: {}",
                e.without_url()
            ))
        })?;

        let elapsed = start_time.elapsed();
        info!("Fetched {} in {:.3}s", endpoint, elapsed.as_secs_f64());
        if elapsed.as_secs() > 5 {
            warn!("Slow weather API response: {:.3}s", elapsed.as_secs_f64());
        }

        Ok(payload)
    }
}

/// weatherapi.com reports failures as `{"error": {"code": .., "message": ..}}`
fn provider_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
