//! Project domain model and wire shapes.
//!
//! # Responsibility
//! - Define the canonical project record and its read projections.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another project.
//! - `user_id` identifies the single owner and is immutable post-creation.

use crate::model::task::Task;
use crate::model::{now_epoch_ms, validate_project_name, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a project.
pub type ProjectId = Uuid;

/// Canonical project record.
///
/// Field names are serialized in camelCase to match the external schema
/// consumed by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Stable global ID, server-generated at creation.
    pub uuid: ProjectId,
    /// Display name. Must be at least five characters.
    pub name: String,
    /// Owning external identity. Immutable after creation.
    pub user_id: String,
    /// Epoch milliseconds, set once at creation.
    pub created_at: i64,
    /// Epoch milliseconds, bumped on each mutation.
    pub updated_at: i64,
}

impl Project {
    /// Creates a new project owned by `user_id` with a generated stable ID.
    pub fn new(name: impl Into<String>, user_id: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            user_id: user_id.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks domain rules for this record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_project_name(&self.name)
    }
}

/// Per-task completion flag carried by the project list projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub completed: bool,
}

/// Narrow list projection: no task bodies, only completion flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub uuid: ProjectId,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub tasks: Vec<TaskCompletion>,
}

/// Detail projection: the full project with its tasks expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectWithTasks {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Vec<Task>,
}
