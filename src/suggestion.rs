//! Natural-language weather suggestions from the Gemini `generateContent` API
//!
//! The generator fails open: callers always receive a string. A missing
//! credential yields a fixed placeholder and any provider failure yields a
//! message starting with [`DEGRADED_PREFIX`].

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::SuggestionConfig;
use crate::{HaikuError, Result};

/// Returned when no text-generation credential is configured
pub const NOT_CONFIGURED: &str = "No Gemini API key configured.";

/// Prefix marking a suggestion that could not be generated
pub const DEGRADED_PREFIX: &str = "Suggestion unavailable: ";

const INSTRUCTION: &str = "Given the following weather data in JSON, provide a relaxing, \
actionable suggestion for the user. Be concise and gentle.";

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// True when `text` is a failure message rather than a real suggestion
#[must_use]
pub fn is_degraded(text: &str) -> bool {
    text.starts_with(DEGRADED_PREFIX) || text == NOT_CONFIGURED
}

fn build_prompt(weather: &Value) -> String {
    format!("{INSTRUCTION}\n\nWeather Data:\n{weather}")
}

/// Wraps a single text-generation call. Cheap to clone.
#[derive(Clone)]
pub struct SuggestionGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl SuggestionGenerator {
    pub fn new(config: &SuggestionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("Haiku/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HaikuError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Suggestion text for the given weather payload. Never fails.
    pub async fn generate(&self, weather: &Value) -> String {
        match self.try_generate(weather).await {
            Ok(text) => text,
            Err(HaikuError::ConfigurationMissing { .. }) => NOT_CONFIGURED.to_string(),
            Err(e) => {
                warn!("Suggestion generation failed: {}", e);
                format!("{DEGRADED_PREFIX}{e}")
            }
        }
    }

    #[instrument(skip_all, fields(model = %self.model))]
    pub async fn try_generate(&self, weather: &Value) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| HaikuError::configuration_missing(NOT_CONFIGURED))?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(api_key)
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(weather),
                }],
            }],
        };

        debug!("Requesting suggestion from {}/models/{}", self.base_url, self.model);
        let start_time = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| HaikuError::upstream(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HaikuError::upstream(format!(
                "provider returned {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            HaikuError::upstream(format!("invalid response: {}", e.without_url()))
        })?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text.trim().to_string())
            .ok_or_else(|| HaikuError::upstream("response contained no candidate text"))?;

        info!(
            "Generated suggestion ({} chars) in {:.3}s",
            text.chars().count(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(text)
    }
}
