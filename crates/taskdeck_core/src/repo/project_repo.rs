//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD APIs over canonical `projects` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Project::validate()` before SQL mutations.
//! - Owner-scoped paths add `user_id = ?` to every id lookup; zero matching
//!   rows yields `NotFound` whether the row is absent or foreign-owned.
//! - List ordering is deterministic: `created_at DESC, uuid ASC`.

use crate::model::project::{Project, ProjectId, ProjectSummary, ProjectWithTasks, TaskCompletion};
use crate::repo::task_repo::{parse_task_row, TASK_SELECT_SQL};
use crate::repo::{parse_bool_column, parse_uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    user_id,
    created_at,
    updated_at
FROM projects";

/// Repository interface for project CRUD and report reads.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<()>;
    /// Caller-owned projects, newest first, with per-task completion flags.
    fn list_projects(&self, user_id: &str) -> RepoResult<Vec<ProjectSummary>>;
    /// One caller-owned project with its tasks, or `None`.
    fn get_project_with_tasks(
        &self,
        user_id: &str,
        id: ProjectId,
    ) -> RepoResult<Option<ProjectWithTasks>>;
    fn delete_project(&self, user_id: &str, id: ProjectId) -> RepoResult<()>;
    /// Cross-user read used only by the public report, newest first.
    fn list_all_with_tasks(&self) -> RepoResult<Vec<ProjectWithTasks>>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn tasks_for_project(&self, project_uuid: ProjectId) -> RepoResult<Vec<crate::model::task::Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE project_uuid = ?1
             ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![project_uuid.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn completion_flags(&self, project_uuid: ProjectId) -> RepoResult<Vec<TaskCompletion>> {
        let mut stmt = self.conn.prepare(
            "SELECT completed FROM tasks
             WHERE project_uuid = ?1
             ORDER BY created_at ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query(params![project_uuid.to_string()])?;
        let mut flags = Vec::new();
        while let Some(row) = rows.next()? {
            let completed = parse_bool_column(row.get("completed")?, "tasks.completed")?;
            flags.push(TaskCompletion { completed });
        }
        Ok(flags)
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        self.conn.execute(
            "INSERT INTO projects (uuid, name, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                project.uuid.to_string(),
                project.name.as_str(),
                project.user_id.as_str(),
                project.created_at,
                project.updated_at,
            ],
        )?;

        Ok(())
    }

    fn list_projects(&self, user_id: &str) -> RepoResult<Vec<ProjectSummary>> {
        let projects = {
            let mut stmt = self.conn.prepare(&format!(
                "{PROJECT_SELECT_SQL}
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, uuid ASC;"
            ))?;
            let mut rows = stmt.query(params![user_id])?;
            let mut projects = Vec::new();
            while let Some(row) = rows.next()? {
                projects.push(parse_project_row(row)?);
            }
            projects
        };

        let mut summaries = Vec::with_capacity(projects.len());
        for project in projects {
            let tasks = self.completion_flags(project.uuid)?;
            summaries.push(ProjectSummary {
                uuid: project.uuid,
                name: project.name,
                created_at: project.created_at,
                updated_at: project.updated_at,
                tasks,
            });
        }

        Ok(summaries)
    }

    fn get_project_with_tasks(
        &self,
        user_id: &str,
        id: ProjectId,
    ) -> RepoResult<Option<ProjectWithTasks>> {
        let project = {
            let mut stmt = self.conn.prepare(&format!(
                "{PROJECT_SELECT_SQL}
                 WHERE uuid = ?1 AND user_id = ?2;"
            ))?;
            let mut rows = stmt.query(params![id.to_string(), user_id])?;
            match rows.next()? {
                Some(row) => parse_project_row(row)?,
                None => return Ok(None),
            }
        };

        let tasks = self.tasks_for_project(project.uuid)?;
        Ok(Some(ProjectWithTasks { project, tasks }))
    }

    fn delete_project(&self, user_id: &str, id: ProjectId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM projects WHERE uuid = ?1 AND user_id = ?2;",
            params![id.to_string(), user_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list_all_with_tasks(&self) -> RepoResult<Vec<ProjectWithTasks>> {
        let projects = {
            let mut stmt = self.conn.prepare(&format!(
                "{PROJECT_SELECT_SQL}
                 ORDER BY created_at DESC, uuid ASC;"
            ))?;
            let mut rows = stmt.query([])?;
            let mut projects = Vec::new();
            while let Some(row) = rows.next()? {
                projects.push(parse_project_row(row)?);
            }
            projects
        };

        let mut expanded = Vec::with_capacity(projects.len());
        for project in projects {
            let tasks = self.tasks_for_project(project.uuid)?;
            expanded.push(ProjectWithTasks { project, tasks });
        }

        Ok(expanded)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid_column(&uuid_text, "projects.uuid")?;

    let project = Project {
        uuid,
        name: row.get("name")?,
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    project.validate()?;
    Ok(project)
}
