//! Wire shapes for the backend's REST contract.

use chrono::NaiveDate;
use leadmate_core::project::Project;
use leadmate_core::types::{EntityId, ProjectStatus};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Payload for creating a project. The server assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_lead_id: Option<EntityId>,
}

impl NewProject {
    /// The optimistic local entity shown until the server confirms.
    pub fn into_project(self, placeholder: EntityId) -> Project {
        let mut project = Project::new(placeholder, self.title);
        project.description = self.description;
        project.deadline = self.deadline;
        project.team_lead_id = self.team_lead_id;
        project
    }
}

/// Partial project update. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_lead_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

impl ProjectPatch {
    /// Compute the optimistic replacement entity for the mutation engine.
    pub fn apply_to(&self, mut project: Project) -> Project {
        if let Some(title) = &self.title {
            project.update_title(title.clone());
        }
        if let Some(description) = &self.description {
            project.set_description(description.clone());
        }
        if let Some(deadline) = self.deadline {
            project.set_deadline(Some(deadline));
        }
        if let Some(status) = self.status {
            project.set_status(status);
        }
        if let Some(lead) = &self.team_lead_id {
            project.set_team_lead(Some(lead.clone()));
        }
        if let Some(progress) = self.progress {
            project.set_progress(progress);
        }
        project
    }

    /// The wire body for an in-flight update: every known field of the
    /// optimistic entity.
    pub fn from_entity(project: &Project) -> Self {
        Self {
            title: Some(project.title.clone()),
            description: project.description.clone(),
            deadline: project.deadline,
            status: Some(project.status),
            team_lead_id: project.team_lead_id.clone(),
            progress: Some(project.progress),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Tenancy and scope ids attached to every agent call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatContext {
    pub company_id: EntityId,
    pub lead_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// One file in a multipart upload.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
