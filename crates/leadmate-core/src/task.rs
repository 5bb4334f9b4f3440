use crate::types::{EntityId, Priority, TaskStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A kanban card. Created in bulk by the backend's generation endpoint;
/// the only client-side mutation is an atomic status replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub project_id: Option<EntityId>,
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl Task {
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            due_date: None,
            project_id: None,
        }
    }

    /// Replace the status field atomically. No partial updates exist.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

/// Human-readable summary: "2 todo, 1 in progress, 3 completed"
pub fn summarize(tasks: &[&Task]) -> String {
    let todo = tasks.iter().filter(|t| t.status == TaskStatus::Todo).count();
    let in_progress = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::InProgress)
        .count();
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    format!("{todo} todo, {in_progress} in progress, {completed} completed")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
