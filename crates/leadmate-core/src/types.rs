use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// Server-assigned identifier for an entity. Optimistic creates use a
/// client-generated `local-` placeholder until the backend confirms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn placeholder(seq: u64) -> Self {
        Self(format!("local-{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for client-generated ids not yet confirmed by the backend.
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with("local-")
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

/// Any status may follow any other; the lifecycle is deliberately loose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    Completed,
    #[serde(alias = "on-hold")]
    OnHold,
    Cancelled,
}

impl ProjectStatus {
    pub fn all() -> &'static [ProjectStatus] {
        &[
            ProjectStatus::Planning,
            ProjectStatus::Active,
            ProjectStatus::Completed,
            ProjectStatus::OnHold,
            ProjectStatus::Cancelled,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = crate::error::LeadMateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(ProjectStatus::Planning),
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            "on_hold" | "on-hold" => Ok(ProjectStatus::OnHold),
            "cancelled" => Ok(ProjectStatus::Cancelled),
            _ => Err(crate::error::LeadMateError::InvalidProjectStatus(
                s.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Kanban column. A task is always in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    /// The backend historically sends both `in_progress` and `inprogress`.
    #[serde(alias = "inprogress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn all() -> &'static [TaskStatus] {
        &[TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Completed]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = crate::error::LeadMateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(crate::error::LeadMateError::InvalidTaskStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = crate::error::LeadMateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(crate::error::LeadMateError::InvalidPriority(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// MessageRole
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// AgentKind
// ---------------------------------------------------------------------------

/// Backend AI agent endpoints the chat front-end can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    DocumentQa,
    TechStack,
    TeamFormation,
    CodeAnalysis,
}

impl AgentKind {
    pub fn all() -> &'static [AgentKind] {
        &[
            AgentKind::DocumentQa,
            AgentKind::TechStack,
            AgentKind::TeamFormation,
            AgentKind::CodeAnalysis,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::DocumentQa => "document_qa",
            AgentKind::TechStack => "tech_stack",
            AgentKind::TeamFormation => "team_formation",
            AgentKind::CodeAnalysis => "code_analysis",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = crate::error::LeadMateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document_qa" | "docs" => Ok(AgentKind::DocumentQa),
            "tech_stack" | "stack" => Ok(AgentKind::TechStack),
            "team_formation" | "team" => Ok(AgentKind::TeamFormation),
            "code_analysis" | "code" => Ok(AgentKind::CodeAnalysis),
            _ => Err(crate::error::LeadMateError::InvalidAgent(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Manager,
    TeamLead,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::Manager => "manager",
            UserRole::TeamLead => "team_lead",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for UserRole {
    type Err = crate::error::LeadMateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(UserRole::Manager),
            "team_lead" | "team-lead" | "lead" => Ok(UserRole::TeamLead),
            _ => Err(crate::error::LeadMateError::InvalidRole(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn placeholder_ids_are_recognized() {
        let id = EntityId::placeholder(7);
        assert_eq!(id.as_str(), "local-7");
        assert!(id.is_placeholder());
        assert!(!EntityId::new("p-42").is_placeholder());
    }

    #[test]
    fn project_status_roundtrip() {
        for status in ProjectStatus::all() {
            let parsed = ProjectStatus::from_str(status.as_str()).unwrap();
            assert_eq!(*status, parsed);
        }
    }

    #[test]
    fn task_status_accepts_legacy_spelling() {
        assert_eq!(
            TaskStatus::from_str("inprogress").unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"inprogress\"").unwrap(),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn task_status_rejects_unknown() {
        assert!(TaskStatus::from_str("paused").is_err());
    }

    #[test]
    fn agent_kind_short_names() {
        assert_eq!(AgentKind::from_str("docs").unwrap(), AgentKind::DocumentQa);
        assert_eq!(AgentKind::from_str("code").unwrap(), AgentKind::CodeAnalysis);
        assert!(AgentKind::from_str("oracle").is_err());
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }
}
