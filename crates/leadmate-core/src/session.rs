//! Process-wide session context.
//!
//! The bearer token and resolved user travel together in one explicit
//! object handed to whoever needs them, with init-on-login and
//! clear-on-logout, instead of ambient module-level state.

use crate::error::{LeadMateError, Result};
use crate::types::{EntityId, UserRole};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The authenticated user, as resolved by the backend's whoami call.
/// `company_id` is the tenancy key for all chat and task operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: EntityId,
    pub name: String,
    pub role: UserRole,
    pub company_id: EntityId,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    token: Option<String>,
    user: Option<UserProfile>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the session after a successful login + whoami.
    pub fn login(&mut self, token: impl Into<String>, user: UserProfile) {
        self.token = Some(token.into());
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.user = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(LeadMateError::NotLoggedIn)
    }

    pub fn user(&self) -> Result<&UserProfile> {
        self.user.as_ref().ok_or(LeadMateError::NotLoggedIn)
    }

    pub fn company_id(&self) -> Result<&EntityId> {
        Ok(&self.user()?.company_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
