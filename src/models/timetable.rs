use serde::{Deserialize, Serialize};

/// One slot in the weekly timetable. Day and times are free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    /// e.g. "Monday"
    pub day: String,
    /// e.g. "09:00"
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    #[serde(default)]
    pub location: Option<String>,
}
