//! Cross-user project report aggregation.
//!
//! # Responsibility
//! - Derive global statistics and per-project rows from the full dataset.
//!
//! # Invariants
//! - Every project falls into exactly one class: all-tasks-completed,
//!   no-tasks, or in-progress; `projects_in_progress` is derived by
//!   subtraction so the three classes always sum to the total.
//! - Completion rates round half away from zero; an empty denominator
//!   yields zero.

use crate::model::project::{ProjectId, ProjectWithTasks};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Global statistics block of the public report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatistics {
    pub total_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    /// Percent, 0..=100.
    pub completion_rate: u32,
    /// Count of distinct owning identities.
    pub total_users: usize,
    pub projects_with_all_tasks_completed: usize,
    pub projects_with_no_tasks: usize,
    pub projects_in_progress: usize,
}

/// Per-project row of the public report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReportRow {
    pub uuid: ProjectId,
    pub name: String,
    pub created_at: i64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: u32,
}

/// Full report payload: statistics plus per-project rows, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub statistics: ReportStatistics,
    pub projects: Vec<ProjectReportRow>,
}

/// Builds the report from the full cross-user dataset.
///
/// Input order is preserved in the `projects` rows; callers pass projects
/// newest first.
pub fn build_report(projects: &[ProjectWithTasks]) -> ProjectReport {
    let total_projects = projects.len();
    let total_tasks: usize = projects.iter().map(|entry| entry.tasks.len()).sum();
    let completed_tasks: usize = projects
        .iter()
        .map(|entry| entry.tasks.iter().filter(|task| task.completed).count())
        .sum();
    let in_progress_tasks = total_tasks - completed_tasks;

    let total_users = projects
        .iter()
        .map(|entry| entry.project.user_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut projects_with_all_tasks_completed = 0;
    let mut projects_with_no_tasks = 0;
    for entry in projects {
        if entry.tasks.is_empty() {
            projects_with_no_tasks += 1;
        } else if entry.tasks.iter().all(|task| task.completed) {
            projects_with_all_tasks_completed += 1;
        }
    }
    // Derived, never re-scanned: guarantees the three classes partition the
    // total.
    let projects_in_progress =
        total_projects - projects_with_all_tasks_completed - projects_with_no_tasks;

    let rows = projects
        .iter()
        .map(|entry| {
            let row_total = entry.tasks.len();
            let row_completed = entry.tasks.iter().filter(|task| task.completed).count();
            ProjectReportRow {
                uuid: entry.project.uuid,
                name: entry.project.name.clone(),
                created_at: entry.project.created_at,
                total_tasks: row_total,
                completed_tasks: row_completed,
                completion_rate: completion_rate(row_completed, row_total),
            }
        })
        .collect();

    ProjectReport {
        statistics: ReportStatistics {
            total_projects,
            total_tasks,
            completed_tasks,
            in_progress_tasks,
            completion_rate: completion_rate(completed_tasks, total_tasks),
            total_users,
            projects_with_all_tasks_completed,
            projects_with_no_tasks,
            projects_in_progress,
        },
        projects: rows,
    }
}

/// Percent completion rounded half away from zero; zero when `total` is zero.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 * 100.0) / total as f64).round() as u32
}
