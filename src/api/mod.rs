//! HTTP routes and shared request state

mod resources;
mod weather;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::config::HaikuConfig;
use crate::models::{Coordinates, Task, TimetableEntry};
use crate::resource::ResourceStore;
use crate::store::DocumentStore;
use crate::suggestion::SuggestionGenerator;
use crate::weather::{WeatherApiClient, WeatherService};
use crate::{Result, VERSION};

pub use weather::WeatherQuery;

/// State shared by every handler. Built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub weather: WeatherService,
    pub default_coordinates: Coordinates,
}

impl AppState {
    pub fn new(store: DocumentStore, weather: WeatherService, default_coordinates: Coordinates) -> Self {
        Self {
            store,
            weather,
            default_coordinates,
        }
    }

    /// Builds the provider clients described by `config` around an open store.
    pub fn from_config(config: &HaikuConfig, store: DocumentStore) -> Result<Self> {
        let weather = WeatherService::new(
            WeatherApiClient::new(&config.weather)?,
            SuggestionGenerator::new(&config.suggestion)?,
        );
        Ok(Self::new(store, weather, config.default_coordinates()))
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    tasks: usize,
    timetable: usize,
}

async fn health(State(state): State<AppState>) -> Result<Json<Health>> {
    let tasks = ResourceStore::<Task>::new(&state.store)?.count().await?;
    let timetable = ResourceStore::<TimetableEntry>::new(&state.store)?.count().await?;
    Ok(Json(Health {
        status: "ok",
        version: VERSION,
        tasks,
        timetable,
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(resources::router::<Task>())
        .merge(resources::router::<TimetableEntry>())
        .route("/weather", get(weather::get_weather))
        .route("/weather/onboard", get(weather::get_weather_onboard))
        .route("/health", get(health))
        .with_state(state)
}
