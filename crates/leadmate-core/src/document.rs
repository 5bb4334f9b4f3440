use crate::types::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// An uploaded project document. Immutable after upload except for explicit
/// deletion; deletion is immediate and not undoable client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: EntityId,
    pub filename: String,
    pub size: u64,
    pub content_type: String,
    pub uploaded_by: String,
    /// None when backend text extraction failed for this file.
    #[serde(default)]
    pub extracted_content: Option<String>,
    #[serde(default)]
    pub project_id: Option<EntityId>,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn has_extracted_text(&self) -> bool {
        self.extracted_content
            .as_deref()
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    }
}
