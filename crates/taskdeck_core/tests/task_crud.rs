use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::{
    Project, ProjectRepository, RepoError, SqliteProjectRepository, SqliteTaskRepository, Task,
    TaskRepository,
};

fn seeded_project(conn: &rusqlite::Connection, user_id: &str) -> Project {
    let repo = SqliteProjectRepository::new(conn);
    let project = Project::new(format!("{user_id} project"), user_id);
    repo.create_project(&project).unwrap();
    project
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let project = seeded_project(&conn, "user_a");
    let repo = SqliteTaskRepository::new(&conn);

    let task = Task::new(project.uuid, "write tests", "user_a");
    repo.create_task(&task).unwrap();

    let loaded = repo.get_task("user_a", task.uuid).unwrap().unwrap();
    assert_eq!(loaded, task);
    assert!(!loaded.completed);
}

#[test]
fn create_rejects_short_title() {
    let conn = open_db_in_memory().unwrap();
    let project = seeded_project(&conn, "user_a");
    let repo = SqliteTaskRepository::new(&conn);

    let task = Task::new(project.uuid, "ab", "user_a");
    let err = repo.create_task(&task).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn create_on_foreign_project_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let project = seeded_project(&conn, "user_a");
    let repo = SqliteTaskRepository::new(&conn);

    let task = Task::new(project.uuid, "sneaky task", "user_b");
    let err = repo.create_task(&task).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}

#[test]
fn set_completed_returns_updated_row() {
    let conn = open_db_in_memory().unwrap();
    let project = seeded_project(&conn, "user_a");
    let repo = SqliteTaskRepository::new(&conn);

    let task = Task::new(project.uuid, "toggle me", "user_a");
    repo.create_task(&task).unwrap();

    let updated = repo.set_completed("user_a", task.uuid, true).unwrap();
    assert!(updated.completed);
    assert_eq!(updated.uuid, task.uuid);

    let reverted = repo.set_completed("user_a", task.uuid, false).unwrap();
    assert!(!reverted.completed);
}

#[test]
fn mutations_are_scoped_by_owner() {
    let conn = open_db_in_memory().unwrap();
    let project = seeded_project(&conn, "user_a");
    let repo = SqliteTaskRepository::new(&conn);

    let task = Task::new(project.uuid, "private task", "user_a");
    repo.create_task(&task).unwrap();

    let toggle_err = repo.set_completed("user_b", task.uuid, true).unwrap_err();
    assert!(matches!(toggle_err, RepoError::NotFound(_)));

    let delete_err = repo.delete_task("user_b", task.uuid).unwrap_err();
    assert!(matches!(delete_err, RepoError::NotFound(_)));

    // Still visible and unchanged for the real owner.
    let loaded = repo.get_task("user_a", task.uuid).unwrap().unwrap();
    assert!(!loaded.completed);
}

#[test]
fn delete_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let project = seeded_project(&conn, "user_a");
    let repo = SqliteTaskRepository::new(&conn);

    let task = Task::new(project.uuid, "short lived", "user_a");
    repo.create_task(&task).unwrap();
    repo.delete_task("user_a", task.uuid).unwrap();

    assert!(repo.get_task("user_a", task.uuid).unwrap().is_none());
}
