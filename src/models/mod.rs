//! Data models for the Haiku backend
//!
//! - Task: to-do items with optional description and deadline
//! - Timetable: weekly schedule entries
//! - Weather: coordinates and the report shapes served by the weather endpoints

pub mod task;
pub mod timetable;
pub mod weather;

pub use task::Task;
pub use timetable::TimetableEntry;
pub use weather::{Coordinates, FullReport, OnboardReport, Umbrella};
