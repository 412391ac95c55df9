//! Domain model for projects and their tasks.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Enforce input-shape invariants before anything reaches persistence.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - Ownership (`user_id`) is set at creation and never mutated.
//! - Timestamps are epoch milliseconds, comparable after any (de)serialization.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod project;
pub mod task;

/// Minimum character count for a project name.
pub const PROJECT_NAME_MIN_CHARS: usize = 5;
/// Minimum character count for a task title.
pub const TASK_TITLE_MIN_CHARS: usize = 3;

/// Domain rule violations raised before any persistence call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    ProjectNameTooShort { actual_chars: usize },
    TaskTitleTooShort { actual_chars: usize },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNameTooShort { actual_chars } => write!(
                f,
                "project name must be at least {PROJECT_NAME_MIN_CHARS} characters, got {actual_chars}"
            ),
            Self::TaskTitleTooShort { actual_chars } => write!(
                f,
                "task title must be at least {TASK_TITLE_MIN_CHARS} characters, got {actual_chars}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Validates a project name against the minimum-length rule.
pub fn validate_project_name(name: &str) -> Result<(), ValidationError> {
    let actual_chars = name.chars().count();
    if actual_chars < PROJECT_NAME_MIN_CHARS {
        return Err(ValidationError::ProjectNameTooShort { actual_chars });
    }
    Ok(())
}

/// Validates a task title against the minimum-length rule.
pub fn validate_task_title(title: &str) -> Result<(), ValidationError> {
    let actual_chars = title.chars().count();
    if actual_chars < TASK_TITLE_MIN_CHARS {
        return Err(ValidationError::TaskTitleTooShort { actual_chars });
    }
    Ok(())
}

/// Current wall-clock time as epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
