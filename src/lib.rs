//! `Haiku` - relaxing daily planner backend
//!
//! This library provides the document store, the task and timetable CRUD
//! resources, and the weather pipeline that turns provider data into an
//! umbrella recommendation and a gentle suggestion.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod resource;
pub mod store;
pub mod suggestion;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::HaikuConfig;
pub use error::{ErrorKind, HaikuError};
pub use models::{Coordinates, FullReport, OnboardReport, Task, TimetableEntry, Umbrella};
pub use resource::{Resource, ResourceStore, Stored};
pub use store::DocumentStore;
pub use suggestion::SuggestionGenerator;
pub use weather::{WeatherApiClient, WeatherService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, HaikuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
