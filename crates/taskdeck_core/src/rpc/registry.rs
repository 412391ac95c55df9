//! Procedure registry and dispatch.
//!
//! # Responsibility
//! - Declare the fixed operation descriptors (name, kind, auth policy).
//! - Dispatch dotted procedure names to handlers over the persistence
//!   gateway.
//!
//! # Invariants
//! - Dispatch order is fixed: name lookup, auth gate, input decode and
//!   validation, handler. Inputs failing validation never reach a
//!   repository.
//! - Unknown procedure names map to `NotFound`.

use crate::model::project::ProjectId;
use crate::model::task::{Task, TaskId};
use crate::model::{validate_project_name, validate_task_title};
use crate::model::project::Project;
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::rpc::context::{require_identity, RequestContext};
use crate::rpc::error::ProcedureError;
use crate::rpc::report::build_report;
use log::debug;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PROJECT_GET_ALL: &str = "project.getAllProjects";
pub const PROJECT_GET_BY_ID: &str = "project.getProjectById";
pub const PROJECT_CREATE: &str = "project.create";
pub const PROJECT_DELETE: &str = "project.delete";
pub const PROJECT_REPORT: &str = "project.getAllUsersProjectReport";
pub const TASK_CREATE: &str = "task.create";
pub const TASK_TOGGLE: &str = "task.toggle";
pub const TASK_DELETE: &str = "task.delete";

/// Operation kind: read-only and retry-safe, or state-changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureKind {
    Query,
    Mutation,
}

/// Identity requirement for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    Public,
    Protected,
}

/// Static description of one named operation.
#[derive(Debug, Clone, Copy)]
pub struct ProcedureDescriptor {
    pub name: &'static str,
    pub kind: ProcedureKind,
    pub auth: AuthPolicy,
}

/// The complete operation surface, looked up by name at the transport
/// boundary.
pub const PROCEDURES: &[ProcedureDescriptor] = &[
    ProcedureDescriptor {
        name: PROJECT_GET_ALL,
        kind: ProcedureKind::Query,
        auth: AuthPolicy::Protected,
    },
    ProcedureDescriptor {
        name: PROJECT_GET_BY_ID,
        kind: ProcedureKind::Query,
        auth: AuthPolicy::Protected,
    },
    ProcedureDescriptor {
        name: PROJECT_CREATE,
        kind: ProcedureKind::Mutation,
        auth: AuthPolicy::Protected,
    },
    ProcedureDescriptor {
        name: PROJECT_DELETE,
        kind: ProcedureKind::Mutation,
        auth: AuthPolicy::Protected,
    },
    ProcedureDescriptor {
        name: PROJECT_REPORT,
        kind: ProcedureKind::Query,
        auth: AuthPolicy::Public,
    },
    ProcedureDescriptor {
        name: TASK_CREATE,
        kind: ProcedureKind::Mutation,
        auth: AuthPolicy::Protected,
    },
    ProcedureDescriptor {
        name: TASK_TOGGLE,
        kind: ProcedureKind::Mutation,
        auth: AuthPolicy::Protected,
    },
    ProcedureDescriptor {
        name: TASK_DELETE,
        kind: ProcedureKind::Mutation,
        auth: AuthPolicy::Protected,
    },
];

/// Returns the descriptor for a dotted procedure name.
pub fn descriptor(name: &str) -> Option<&'static ProcedureDescriptor> {
    PROCEDURES.iter().find(|entry| entry.name == name)
}

#[derive(Debug, Deserialize)]
struct ProjectByIdInput {
    #[serde(rename = "projectId")]
    project_id: ProjectId,
}

#[derive(Debug, Deserialize)]
struct CreateProjectInput {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreateTaskInput {
    #[serde(rename = "projectId")]
    project_id: ProjectId,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ToggleTaskInput {
    #[serde(rename = "taskId")]
    task_id: TaskId,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct DeleteTaskInput {
    #[serde(rename = "taskId")]
    task_id: TaskId,
}

/// Server-side procedure dispatcher over one SQLite connection.
pub struct Router<'conn> {
    conn: &'conn Connection,
}

impl<'conn> Router<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Executes one named procedure call.
    ///
    /// # Errors
    /// - `NotFound` for unknown names or unowned/absent resources.
    /// - `Unauthorized` for protected calls without identity.
    /// - `Validation` for inputs failing schema or domain rules; these never
    ///   touch the persistence gateway.
    pub fn dispatch(
        &self,
        ctx: &RequestContext,
        name: &str,
        input: &Value,
    ) -> Result<Value, ProcedureError> {
        let desc = descriptor(name).ok_or(ProcedureError::NotFound)?;

        let caller = match desc.auth {
            AuthPolicy::Protected => Some(require_identity(ctx)?.to_string()),
            AuthPolicy::Public => None,
        };
        debug!(
            "event=procedure_dispatch module=rpc name={} kind={:?} authenticated={}",
            name,
            desc.kind,
            caller.is_some()
        );

        match name {
            PROJECT_GET_ALL => self.get_all_projects(&expect_caller(caller)?),
            PROJECT_GET_BY_ID => {
                let input: ProjectByIdInput = decode_input(input)?;
                self.get_project_by_id(&expect_caller(caller)?, input.project_id)
            }
            PROJECT_CREATE => {
                let input: CreateProjectInput = decode_input(input)?;
                validate_project_name(&input.name)?;
                self.create_project(&expect_caller(caller)?, input.name)
            }
            PROJECT_DELETE => {
                let input: ProjectByIdInput = decode_input(input)?;
                self.delete_project(&expect_caller(caller)?, input.project_id)
            }
            PROJECT_REPORT => self.all_users_project_report(),
            TASK_CREATE => {
                let input: CreateTaskInput = decode_input(input)?;
                validate_task_title(&input.title)?;
                self.create_task(&expect_caller(caller)?, input.project_id, input.title)
            }
            TASK_TOGGLE => {
                let input: ToggleTaskInput = decode_input(input)?;
                self.toggle_task(&expect_caller(caller)?, input.task_id, input.completed)
            }
            TASK_DELETE => {
                let input: DeleteTaskInput = decode_input(input)?;
                self.delete_task(&expect_caller(caller)?, input.task_id)
            }
            _ => Err(ProcedureError::NotFound),
        }
    }

    fn get_all_projects(&self, caller: &str) -> Result<Value, ProcedureError> {
        let repo = SqliteProjectRepository::new(self.conn);
        let summaries = repo.list_projects(caller)?;
        to_wire(&summaries)
    }

    fn get_project_by_id(
        &self,
        caller: &str,
        project_id: ProjectId,
    ) -> Result<Value, ProcedureError> {
        let repo = SqliteProjectRepository::new(self.conn);
        match repo.get_project_with_tasks(caller, project_id)? {
            Some(detail) => to_wire(&detail),
            None => Err(ProcedureError::NotFound),
        }
    }

    fn create_project(&self, caller: &str, name: String) -> Result<Value, ProcedureError> {
        let repo = SqliteProjectRepository::new(self.conn);
        let project = Project::new(name, caller);
        repo.create_project(&project)?;
        to_wire(&project)
    }

    fn delete_project(&self, caller: &str, project_id: ProjectId) -> Result<Value, ProcedureError> {
        let repo = SqliteProjectRepository::new(self.conn);
        repo.delete_project(caller, project_id)?;
        Ok(json!({ "success": true }))
    }

    fn all_users_project_report(&self) -> Result<Value, ProcedureError> {
        let repo = SqliteProjectRepository::new(self.conn);
        let projects = repo.list_all_with_tasks()?;
        to_wire(&build_report(&projects))
    }

    fn create_task(
        &self,
        caller: &str,
        project_id: ProjectId,
        title: String,
    ) -> Result<Value, ProcedureError> {
        let repo = SqliteTaskRepository::new(self.conn);
        let task = Task::new(project_id, title, caller);
        repo.create_task(&task)?;
        to_wire(&task)
    }

    fn toggle_task(
        &self,
        caller: &str,
        task_id: TaskId,
        completed: bool,
    ) -> Result<Value, ProcedureError> {
        let repo = SqliteTaskRepository::new(self.conn);
        let task = repo.set_completed(caller, task_id, completed)?;
        to_wire(&task)
    }

    fn delete_task(&self, caller: &str, task_id: TaskId) -> Result<Value, ProcedureError> {
        let repo = SqliteTaskRepository::new(self.conn);
        repo.delete_task(caller, task_id)?;
        Ok(json!({ "success": true }))
    }
}

fn decode_input<T: DeserializeOwned>(input: &Value) -> Result<T, ProcedureError> {
    serde_json::from_value(input.clone())
        .map_err(|err| ProcedureError::InvalidInput(err.to_string()))
}

fn to_wire<T: Serialize>(value: &T) -> Result<Value, ProcedureError> {
    serde_json::to_value(value).map_err(|err| ProcedureError::Internal(err.to_string()))
}

// The auth gate guarantees `caller` is present for protected arms; this keeps
// that contract explicit without unwrap.
fn expect_caller(caller: Option<String>) -> Result<String, ProcedureError> {
    caller.ok_or(ProcedureError::Unauthorized)
}
