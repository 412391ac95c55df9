use rusqlite::params;
use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::{
    Project, ProjectRepository, RepoError, SqliteProjectRepository, SqliteTaskRepository, Task,
    TaskRepository,
};

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let project = Project::new("launch plan", "user_a");
    repo.create_project(&project).unwrap();

    let loaded = repo
        .get_project_with_tasks("user_a", project.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.project, project);
    assert!(loaded.tasks.is_empty());
}

#[test]
fn create_rejects_short_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let project = Project::new("abcd", "user_a");
    let err = repo.create_project(&project).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM projects;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}

#[test]
fn list_orders_newest_first_with_completion_flags() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    let task_repo = SqliteTaskRepository::new(&conn);

    let older = Project::new("older project", "user_a");
    let newer = Project::new("newer project", "user_a");
    repo.create_project(&older).unwrap();
    repo.create_project(&newer).unwrap();

    // Deterministic ordering regardless of wall-clock resolution.
    conn.execute(
        "UPDATE projects SET created_at = 1000 WHERE uuid = ?1;",
        params![older.uuid.to_string()],
    )
    .unwrap();
    conn.execute(
        "UPDATE projects SET created_at = 2000 WHERE uuid = ?1;",
        params![newer.uuid.to_string()],
    )
    .unwrap();

    let task = Task::new(older.uuid, "first task", "user_a");
    task_repo.create_task(&task).unwrap();
    let done = task_repo.set_completed("user_a", task.uuid, true).unwrap();
    assert!(done.completed);

    let summaries = repo.list_projects("user_a").unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].uuid, newer.uuid);
    assert_eq!(summaries[1].uuid, older.uuid);
    assert!(summaries[0].tasks.is_empty());
    assert_eq!(summaries[1].tasks.len(), 1);
    assert!(summaries[1].tasks[0].completed);
}

#[test]
fn get_is_scoped_by_owner() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let project = Project::new("private plan", "user_a");
    repo.create_project(&project).unwrap();

    // Foreign owner sees absence, not the row.
    let foreign = repo.get_project_with_tasks("user_b", project.uuid).unwrap();
    assert!(foreign.is_none());

    let listed = repo.list_projects("user_b").unwrap();
    assert!(listed.is_empty());
}

#[test]
fn delete_cascades_to_tasks() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    let task_repo = SqliteTaskRepository::new(&conn);

    let project = Project::new("doomed project", "user_a");
    repo.create_project(&project).unwrap();
    task_repo
        .create_task(&Task::new(project.uuid, "task one", "user_a"))
        .unwrap();
    task_repo
        .create_task(&Task::new(project.uuid, "task two", "user_a"))
        .unwrap();

    repo.delete_project("user_a", project.uuid).unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn delete_by_foreign_owner_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let project = Project::new("private plan", "user_a");
    repo.create_project(&project).unwrap();

    let err = repo.delete_project("user_b", project.uuid).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    // The row is untouched.
    assert!(repo
        .get_project_with_tasks("user_a", project.uuid)
        .unwrap()
        .is_some());
}

#[test]
fn all_with_tasks_crosses_users() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    repo.create_project(&Project::new("alpha project", "user_a"))
        .unwrap();
    repo.create_project(&Project::new("bravo project", "user_b"))
        .unwrap();

    let all = repo.list_all_with_tasks().unwrap();
    assert_eq!(all.len(), 2);
}
