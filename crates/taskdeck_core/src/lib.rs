//! Core domain logic for Taskdeck.
//! This crate is the single source of truth for business invariants:
//! project/task persistence, the typed procedure surface, and the wire
//! contract consumed by the client crate.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod rpc;
pub mod transport;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::project::{Project, ProjectId, ProjectSummary, ProjectWithTasks, TaskCompletion};
pub use model::task::{Task, TaskId};
pub use model::ValidationError;
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use rpc::context::RequestContext;
pub use rpc::error::ProcedureError;
pub use rpc::registry::{
    AuthPolicy, ProcedureDescriptor, ProcedureKind, Router, PROCEDURES, PROJECT_CREATE,
    PROJECT_DELETE, PROJECT_GET_ALL, PROJECT_GET_BY_ID, PROJECT_REPORT, TASK_CREATE, TASK_DELETE,
    TASK_TOGGLE,
};
pub use rpc::report::{build_report, ProjectReport, ProjectReportRow, ReportStatistics};
pub use transport::server::serve_batch;
pub use transport::wire::{BatchRequest, BatchResponse, CallOutcome, ErrorCode, ProcedureCall};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
