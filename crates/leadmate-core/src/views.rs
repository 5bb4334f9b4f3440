//! Derived, read-only aggregates over the entity store.
//!
//! Everything here is a pure function of the current store snapshot,
//! recomputed on every call. Dataset sizes are small; correctness over
//! incremental maintenance.

use crate::project::Project;
use crate::store::EntityStore;
use crate::task::Task;
use crate::types::{ProjectStatus, TaskStatus};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Project buckets
// ---------------------------------------------------------------------------

/// Projects partitioned by status, insertion order within each bucket.
#[derive(Debug, Default)]
pub struct ProjectBuckets<'a> {
    pub active: Vec<&'a Project>,
    pub completed: Vec<&'a Project>,
    pub other: Vec<&'a Project>,
}

pub fn projects_by_status(store: &EntityStore) -> ProjectBuckets<'_> {
    let mut buckets = ProjectBuckets::default();
    for project in store.projects.iter() {
        match project.status {
            ProjectStatus::Active => buckets.active.push(project),
            ProjectStatus::Completed => buckets.completed.push(project),
            _ => buckets.other.push(project),
        }
    }
    buckets
}

// ---------------------------------------------------------------------------
// Kanban columns
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TaskColumns<'a> {
    pub todo: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

impl TaskColumns<'_> {
    pub fn counts(&self) -> ColumnCounts {
        ColumnCounts {
            todo: self.todo.len(),
            in_progress: self.in_progress.len(),
            completed: self.completed.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
}

/// Every task lands in exactly one column.
pub fn task_columns(store: &EntityStore) -> TaskColumns<'_> {
    let mut columns = TaskColumns::default();
    for task in store.tasks.iter() {
        match task.status {
            TaskStatus::Todo => columns.todo.push(task),
            TaskStatus::InProgress => columns.in_progress.push(task),
            TaskStatus::Completed => columns.completed.push(task),
        }
    }
    columns
}

// ---------------------------------------------------------------------------
// Dashboard stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    /// Deadline within [today, today + 7 days], both endpoints included.
    pub due_this_week: usize,
    pub tasks: ColumnCounts,
}

pub fn dashboard_stats(store: &EntityStore, now: DateTime<Utc>) -> DashboardStats {
    let today = now.date_naive();
    let window_end = today
        .checked_add_days(Days::new(7))
        .unwrap_or(NaiveDate::MAX);

    let due_this_week = store
        .projects
        .iter()
        .filter(|p| {
            p.deadline
                .map(|d| d >= today && d <= window_end)
                .unwrap_or(false)
        })
        .count();

    DashboardStats {
        total_projects: store.projects.len(),
        active_projects: store
            .projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .count(),
        completed_projects: store
            .projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Completed)
            .count(),
        due_this_week,
        tasks: task_columns(store).counts(),
    }
}

// ---------------------------------------------------------------------------
// Commit histogram
// ---------------------------------------------------------------------------

/// A timestamped repository event, as returned by the code-analysis agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Bucket events into UTC calendar days, ascending. Sparse: days with zero
/// events are omitted rather than fabricated.
pub fn commit_histogram(commits: &[CommitEvent]) -> Vec<(NaiveDate, usize)> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for commit in commits {
        *days.entry(commit.timestamp.date_naive()).or_insert(0) += 1;
    }
    days.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
