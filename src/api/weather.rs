//! Weather handlers
//!
//! Provider failures are returned as `{"error": ..., "kind": ...}` with
//! status 200 by [`HaikuError`]'s response mapping.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use super::AppState;
use crate::models::{Coordinates, FullReport, OnboardReport};
use crate::{HaikuError, Result};

/// `?lat=..&lon=..`, each falling back to the configured default
#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl WeatherQuery {
    #[must_use]
    pub fn resolve(&self, default: Coordinates) -> Coordinates {
        Coordinates::new(
            self.lat.unwrap_or(default.latitude),
            self.lon.unwrap_or(default.longitude),
        )
    }
}

fn coordinates(
    query: std::result::Result<Query<WeatherQuery>, QueryRejection>,
    default: Coordinates,
) -> Result<Coordinates> {
    let Query(query) = query.map_err(|rejection| HaikuError::validation(rejection.body_text()))?;
    Ok(query.resolve(default))
}

pub async fn get_weather(
    State(state): State<AppState>,
    query: std::result::Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<FullReport>> {
    let coords = coordinates(query, state.default_coordinates)?;
    Ok(Json(state.weather.full(coords).await?))
}

pub async fn get_weather_onboard(
    State(state): State<AppState>,
    query: std::result::Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<OnboardReport>> {
    let coords = coordinates(query, state.default_coordinates)?;
    Ok(Json(state.weather.onboard(coords).await?))
}
