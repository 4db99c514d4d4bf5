//! Coordinates and the report shapes served by the weather endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Geographic coordinate pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Reference location used when a request omits its coordinates
    pub const REFERENCE: Coordinates = Coordinates {
        latitude: 23.072190,
        longitude: 76.829600,
    };

    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Provider query form, `"lat,lon"`
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Whether carrying an umbrella is advised. Serialized as `"yes"` / `"no"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Umbrella {
    Yes,
    No,
}

impl From<bool> for Umbrella {
    fn from(recommended: bool) -> Self {
        if recommended { Umbrella::Yes } else { Umbrella::No }
    }
}

impl Umbrella {
    #[must_use]
    pub fn is_recommended(self) -> bool {
        self == Umbrella::Yes
    }
}

/// Compact report for low-power clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardReport {
    /// Current temperature in Celsius, as reported by the provider
    pub temperature: Value,
    pub rain_probability_next_6h: u32,
    pub umbrella_recommended: Umbrella,
    /// Suggestion text, at most 80 characters
    pub suggestion: String,
}

/// Full report: raw provider payloads plus derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullReport {
    pub weather: Value,
    pub forecast: Value,
    pub suggestion: String,
    pub umbrella_recommended: Umbrella,
}
