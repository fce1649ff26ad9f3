//! Field rules and derived state for columns, tasks and tags.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum length of a column or task title.
pub const MAX_TITLE_LEN: usize = 64;

/// Maximum length of a tag title.
pub const MAX_TAG_TITLE_LEN: usize = 32;

/// Maximum length of a task body.
pub const MAX_CONTENT_LEN: usize = 10_000;

/// Upper bound for a task's story points.
pub const MAX_STORY_POINT: i32 = 5_000;

/// Color given to tasks created without one.
pub const DEFAULT_TASK_COLOR: &str = "#8DA2DB";

/// Validate a `#RRGGBB` color string.
pub fn validate_color(color: &str) -> Result<(), CoreError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Expected #RRGGBB"
        )))
    }
}

/// Validate that a task does not end before it starts.
pub fn validate_time_range(
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
) -> Result<(), CoreError> {
    match (start_time, end_time) {
        (Some(start), Some(end)) if end < start => Err(CoreError::Validation(
            "end_time must not be earlier than start_time".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Progress of a task, derived from its start and end times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Idle,
    Active,
    Done,
}

impl TaskStatus {
    pub fn from_times(start_time: Option<Timestamp>, end_time: Option<Timestamp>) -> Self {
        match (start_time, end_time) {
            (Some(_), None) => TaskStatus::Active,
            (Some(_), Some(_)) => TaskStatus::Done,
            _ => TaskStatus::Idle,
        }
    }
}
