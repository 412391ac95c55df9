//! Task domain model.
//!
//! # Invariants
//! - `project_uuid` references an existing project and is immutable.
//! - `completed` defaults to `false` at creation.

use crate::model::project::ProjectId;
use crate::model::{now_epoch_ms, validate_task_title, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub uuid: TaskId,
    /// Owning project. Immutable after creation.
    pub project_uuid: ProjectId,
    /// Creating external identity.
    pub user_id: String,
    /// Display title. Must be at least three characters.
    pub title: String,
    pub completed: bool,
    /// Epoch milliseconds, set once at creation.
    pub created_at: i64,
    /// Epoch milliseconds, bumped on each mutation.
    pub updated_at: i64,
}

impl Task {
    /// Creates a new incomplete task with a generated stable ID.
    pub fn new(
        project_uuid: ProjectId,
        title: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            uuid: Uuid::new_v4(),
            project_uuid,
            user_id: user_id.into(),
            title: title.into(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks domain rules for this record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_task_title(&self.title)
    }
}
