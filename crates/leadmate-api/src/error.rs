use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network unreachable, connection reset, request never completed.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status. `message` is the body's message field when
    /// the server sent one, else a generic fallback.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response body present but not in the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("not logged in")]
    NotAuthenticated,

    #[error(transparent)]
    Client(#[from] leadmate_core::LeadMateError),
}

impl ApiError {
    /// True for errors worth retrying manually (the client never retries on
    /// its own).
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
