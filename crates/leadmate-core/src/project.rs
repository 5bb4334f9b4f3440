use crate::types::{EntityId, ProjectStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    /// Always within [0, 100]; setters clamp out-of-range values.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub team_lead_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: ProjectStatus::Planning,
            deadline: None,
            progress: 0,
            team_lead_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Status transitions are unconstrained; any status may follow any other.
    pub fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
        self.updated_at = Utc::now();
    }

    pub fn set_deadline(&mut self, deadline: Option<NaiveDate>) {
        self.deadline = deadline;
        self.updated_at = Utc::now();
    }

    pub fn set_team_lead(&mut self, lead: Option<EntityId>) {
        self.team_lead_id = lead;
        self.updated_at = Utc::now();
    }

    pub fn update_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_project_starts_in_planning() {
        let p = Project::new("p1", "Billing revamp");
        assert_eq!(p.status, ProjectStatus::Planning);
        assert_eq!(p.progress, 0);
        assert!(p.deadline.is_none());
    }

    #[test]
    fn progress_is_clamped() {
        let mut p = Project::new("p1", "Billing revamp");
        p.set_progress(250);
        assert_eq!(p.progress, 100);
        p.set_progress(42);
        assert_eq!(p.progress, 42);
    }

    #[test]
    fn any_status_may_follow_any_other() {
        let mut p = Project::new("p1", "Billing revamp");
        p.set_status(ProjectStatus::Completed);
        p.set_status(ProjectStatus::Planning);
        assert_eq!(p.status, ProjectStatus::Planning);
    }
}
