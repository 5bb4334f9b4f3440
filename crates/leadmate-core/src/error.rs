use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeadMateError {
    #[error("not logged in: run 'leadmate login'")]
    NotLoggedIn,

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("entity already exists: {0}")]
    EntityExists(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("unknown mutation ticket: {0}")]
    UnknownTicket(u64),

    #[error("invalid project status: {0}")]
    InvalidProjectStatus(String),

    #[error("invalid task status: {0}")]
    InvalidTaskStatus(String),

    #[error("invalid priority: {0}")]
    InvalidPriority(String),

    #[error("invalid agent: {0}")]
    InvalidAgent(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LeadMateError>;
