//! Task model

use serde::{Deserialize, Serialize};

/// A to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// ISO-8601 date-time, stored as given
    #[serde(default)]
    pub deadline: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_default_to_none() {
        let task: Task = serde_json::from_str(r#"{"title":"Buy milk"}"#).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert!(task.description.is_none());
        assert!(task.deadline.is_none());
    }

    #[test]
    fn test_title_is_required() {
        let result: Result<Task, _> = serde_json::from_str(r#"{"description":"no title"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deadline_is_not_validated() {
        let task: Task =
            serde_json::from_str(r#"{"title":"x","deadline":"2024-02-31T25:00:00"}"#).unwrap();
        assert_eq!(task.deadline.as_deref(), Some("2024-02-31T25:00:00"));
    }
}
