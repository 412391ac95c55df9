//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD APIs over canonical `tasks` storage.
//!
//! # Invariants
//! - Write paths must call `Task::validate()` before SQL mutations.
//! - Task creation verifies the target project is owned by the creating
//!   identity; a foreign or absent project yields `NotFound`.
//! - `updated_at` is bumped by every mutation.

use crate::model::task::{Task, TaskId};
use crate::repo::{bool_to_int, parse_bool_column, parse_uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

pub(crate) const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    project_uuid,
    user_id,
    title,
    completed,
    created_at,
    updated_at
FROM tasks";

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, user_id: &str, id: TaskId) -> RepoResult<Option<Task>>;
    /// Sets the completion flag and returns the updated row.
    fn set_completed(&self, user_id: &str, id: TaskId, completed: bool) -> RepoResult<Task>;
    fn delete_task(&self, user_id: &str, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn project_is_owned(&self, project_uuid: &str, user_id: &str) -> RepoResult<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM projects WHERE uuid = ?1 AND user_id = ?2;")?;
        let mut rows = stmt.query(params![project_uuid, user_id])?;
        Ok(rows.next()?.is_some())
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let project_uuid = task.project_uuid.to_string();
        if !self.project_is_owned(&project_uuid, &task.user_id)? {
            return Err(RepoError::NotFound(task.project_uuid));
        }

        self.conn.execute(
            "INSERT INTO tasks (uuid, project_uuid, user_id, title, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                task.uuid.to_string(),
                project_uuid,
                task.user_id.as_str(),
                task.title.as_str(),
                bool_to_int(task.completed),
                task.created_at,
                task.updated_at,
            ],
        )?;

        Ok(())
    }

    fn get_task(&self, user_id: &str, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE uuid = ?1 AND user_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn set_completed(&self, user_id: &str, id: TaskId, completed: bool) -> RepoResult<Task> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                completed = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2 AND user_id = ?3;",
            params![bool_to_int(completed), id.to_string(), user_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        match self.get_task(user_id, id)? {
            Some(task) => Ok(task),
            // The row was just updated under this scope; absence here means
            // concurrent deletion.
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn delete_task(&self, user_id: &str, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE uuid = ?1 AND user_id = ?2;",
            params![id.to_string(), user_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

pub(crate) fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid_column(&uuid_text, "tasks.uuid")?;

    let project_text: String = row.get("project_uuid")?;
    let project_uuid = parse_uuid_column(&project_text, "tasks.project_uuid")?;

    let completed = parse_bool_column(row.get("completed")?, "tasks.completed")?;

    let task = Task {
        uuid,
        project_uuid,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        completed,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    task.validate()?;
    Ok(task)
}
