//! `leadmate-api` — REST driver and sync layer for the LeadMate backend.
//!
//! The backend (auth, persistence, the AI agents) is an opaque HTTP
//! collaborator; this crate is everything that talks to it.
//!
//! # Architecture
//!
//! ```text
//! Dashboard        ← owns EntityStore + ChatSessionManager + SessionContext
//!     │              submit → request → settle, one request per dispatch
//!     ▼
//! Coordinator      ← optimistic apply / commit / rollback (leadmate-core)
//!     │
//!     ▼
//! ApiClient        ← reqwest; bearer auth; status → error taxonomy
//!     │
//!     ▼
//! decode           ← array-vs-wrapped-object normalization, one place
//! ```

pub mod client;
pub mod decode;
pub mod error;
pub mod sync;
pub mod types;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use sync::Dashboard;
pub use types::{ChatContext, FilePart, NewProject, ProjectPatch};
