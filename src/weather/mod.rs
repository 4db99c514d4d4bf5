//! Weather aggregation: provider data, umbrella advice and a suggestion
//!
//! Both reports fetch current conditions and a one-day forecast, then ask the
//! suggestion generator to comment on the current conditions. The onboard
//! report is trimmed for low-bandwidth clients.

pub mod client;
pub mod umbrella;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::models::{Coordinates, FullReport, OnboardReport};
use crate::suggestion::SuggestionGenerator;
use crate::{HaikuError, Result};

pub use client::WeatherApiClient;
pub use umbrella::{RainOutlook, daily_umbrella, next_hours_outlook};

/// Longest suggestion sent to onboard clients, in characters
pub const ONBOARD_SUGGESTION_CHARS: usize = 80;

const FORECAST_DAYS: u8 = 1;

/// Keeps at most `max` characters of `text`
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[derive(Clone)]
pub struct WeatherService {
    client: WeatherApiClient,
    suggestions: SuggestionGenerator,
}

impl WeatherService {
    #[must_use]
    pub fn new(client: WeatherApiClient, suggestions: SuggestionGenerator) -> Self {
        Self {
            client,
            suggestions,
        }
    }

    async fn fetch(&self, coords: Coordinates) -> Result<(Value, Value)> {
        self.client.ensure_configured()?;
        let current = self.client.current(coords).await?;
        let forecast = self.client.forecast(coords, FORECAST_DAYS).await?;
        Ok((current, forecast))
    }

    /// Full provider payloads with a daily umbrella recommendation
    #[instrument(skip(self))]
    pub async fn full(&self, coords: Coordinates) -> Result<FullReport> {
        let (current, forecast) = self.fetch(coords).await?;

        let umbrella = daily_umbrella(&forecast);
        debug!("Daily umbrella recommendation: {:?}", umbrella);

        let suggestion = self.suggestions.generate(&current).await;
        let forecast = forecast.get("forecast").cloned().unwrap_or_else(|| json!({}));

        Ok(FullReport {
            weather: current,
            forecast,
            suggestion,
            umbrella_recommended: umbrella,
        })
    }

    /// Compact report covering the next six hours
    pub async fn onboard(&self, coords: Coordinates) -> Result<OnboardReport> {
        self.onboard_at(coords, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn onboard_at(&self, coords: Coordinates, now: DateTime<Utc>) -> Result<OnboardReport> {
        let (current, forecast) = self.fetch(coords).await?;

        let outlook = next_hours_outlook(&forecast, now)?;
        debug!(
            "Rain outlook: {}% umbrella {:?}",
            outlook.rain_probability, outlook.umbrella
        );

        let temperature = current
            .get("current")
            .and_then(|c| c.get("temp_c"))
            .cloned()
            .ok_or_else(|| {
                HaikuError::upstream("Malformed weather payload: missing current.temp_c")
            })?;

        let suggestion = self.suggestions.generate(&current).await;

        Ok(OnboardReport {
            temperature,
            rain_probability_next_6h: outlook.rain_probability,
            umbrella_recommended: outlook.umbrella,
            suggestion: truncate_chars(&suggestion, ONBOARD_SUGGESTION_CHARS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SuggestionConfig, WeatherConfig};

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 80), "short");
        let long = "a".repeat(120);
        assert_eq!(truncate_chars(&long, 80).chars().count(), 80);
        // multi-byte characters are never split
        assert_eq!(truncate_chars("☀️☔🌈", 2), "☀️");
    }

    #[tokio::test]
    async fn test_unconfigured_service_fails_without_network() {
        let service = WeatherService::new(
            WeatherApiClient::new(&WeatherConfig::default()).unwrap(),
            SuggestionGenerator::new(&SuggestionConfig::default()).unwrap(),
        );

        let err = service.full(Coordinates::REFERENCE).await.unwrap_err();
        assert!(matches!(err, HaikuError::ConfigurationMissing { .. }));

        let err = service.onboard(Coordinates::REFERENCE).await.unwrap_err();
        assert!(matches!(err, HaikuError::ConfigurationMissing { .. }));
    }
}
