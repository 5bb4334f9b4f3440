//! Per-(agent, context) chat sessions.
//!
//! Each backend agent keeps one independent message log per context (a
//! project id, or the lead id as fallback). Logs are append-only; server
//! history is merged once on open and is authoritative for anything with a
//! server-assigned id, with local pending messages re-appended after it.
//! Sessions live outside the entity store for the lifetime of the page.

use crate::types::{AgentKind, EntityId, MessageRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Chat scope: a project, or the lead's own id when no project is selected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextId {
    Project(EntityId),
    Lead(EntityId),
}

impl ContextId {
    pub fn id(&self) -> &EntityId {
        match self {
            ContextId::Project(id) | ContextId::Lead(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub agent: AgentKind,
    pub context: ContextId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: EntityId,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loading,
    Ready,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    pub state: SessionState,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    fn new() -> Self {
        Self {
            state: SessionState::Empty,
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

// ---------------------------------------------------------------------------
// ChatSessionManager
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ChatSessionManager {
    sessions: HashMap<SessionKey, ChatSession>,
    local_seq: u64,
}

impl ChatSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a session as loading its server history. Idempotent for
    /// sessions already past `Empty`.
    pub fn open(&mut self, key: SessionKey) {
        let session = self.sessions.entry(key).or_insert_with(ChatSession::new);
        if session.state == SessionState::Empty {
            session.state = SessionState::Loading;
        }
    }

    /// Merge server history into the session. Server history is
    /// authoritative for anything with a server-assigned id; local-only
    /// pending messages are re-appended after it. Merging the same history
    /// twice leaves the log unchanged.
    pub fn merge_history(&mut self, key: SessionKey, server: Vec<ChatMessage>) {
        let session = self.sessions.entry(key).or_insert_with(ChatSession::new);

        let pending: Vec<ChatMessage> = session
            .messages
            .iter()
            .filter(|m| m.id.is_placeholder() && !server.iter().any(|s| s.id == m.id))
            .cloned()
            .collect();

        let mut merged: Vec<ChatMessage> = Vec::with_capacity(server.len() + pending.len());
        for message in server {
            if !merged.iter().any(|m| m.id == message.id) {
                merged.push(message);
            }
        }
        merged.extend(pending);

        session.messages = merged;
        session.state = SessionState::Ready;
    }

    /// Append the user's message optimistically. A sent user message is
    /// always kept, even if the agent later fails to respond.
    pub fn append_local(&mut self, key: SessionKey, content: impl Into<String>) {
        self.append(key, MessageRole::User, content);
    }

    /// Append the agent's reply once the backend call resolves.
    pub fn append_remote(&mut self, key: SessionKey, content: impl Into<String>) {
        self.append(key, MessageRole::Assistant, content);
    }

    /// Append a visible assistant-role error bubble for a failed send.
    pub fn append_error(&mut self, key: SessionKey, detail: impl Into<String>) {
        let text = format!("Something went wrong: {}", detail.into());
        self.append(key, MessageRole::Assistant, text);
    }

    /// Empty one (agent, context) session; every other session keeps its
    /// history.
    pub fn clear(&mut self, key: &SessionKey) {
        if let Some(session) = self.sessions.get_mut(key) {
            session.messages.clear();
            session.state = SessionState::Empty;
        }
    }

    pub fn session(&self, key: &SessionKey) -> Option<&ChatSession> {
        self.sessions.get(key)
    }

    pub fn messages(&self, key: &SessionKey) -> &[ChatMessage] {
        self.sessions.get(key).map(|s| s.messages()).unwrap_or(&[])
    }

    pub fn state(&self, key: &SessionKey) -> SessionState {
        self.sessions
            .get(key)
            .map(|s| s.state)
            .unwrap_or(SessionState::Empty)
    }

    fn append(&mut self, key: SessionKey, role: MessageRole, content: impl Into<String>) {
        self.local_seq += 1;
        let message = ChatMessage {
            id: EntityId::placeholder(self.local_seq),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        };
        let session = self.sessions.entry(key).or_insert_with(ChatSession::new);
        if session.state == SessionState::Empty {
            session.state = SessionState::Ready;
        }
        session.messages.push(message);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn key(agent: AgentKind, ctx: &str) -> SessionKey {
        SessionKey {
            agent,
            context: ContextId::Project(EntityId::new(ctx)),
        }
    }

    fn server_msg(id: &str, role: MessageRole, content: &str) -> ChatMessage {
        ChatMessage {
            id: EntityId::new(id),
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn open_moves_empty_session_to_loading() {
        let mut mgr = ChatSessionManager::new();
        let k = key(AgentKind::DocumentQa, "p1");
        assert_eq!(mgr.state(&k), SessionState::Empty);
        mgr.open(k.clone());
        assert_eq!(mgr.state(&k), SessionState::Loading);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut mgr = ChatSessionManager::new();
        let k = key(AgentKind::DocumentQa, "p1");
        let history = vec![
            server_msg("m1", MessageRole::User, "What does the pitch say?"),
            server_msg("m2", MessageRole::Assistant, "It proposes..."),
        ];

        mgr.open(k.clone());
        mgr.merge_history(k.clone(), history.clone());
        mgr.merge_history(k.clone(), history);

        assert_eq!(mgr.messages(&k).len(), 2);
        assert_eq!(mgr.state(&k), SessionState::Ready);
    }

    #[test]
    fn merge_keeps_pending_local_messages_after_history() {
        let mut mgr = ChatSessionManager::new();
        let k = key(AgentKind::TechStack, "p1");

        mgr.open(k.clone());
        mgr.append_local(k.clone(), "Which database should we use?");
        mgr.merge_history(k.clone(), vec![server_msg("m1", MessageRole::User, "earlier")]);

        let messages = mgr.messages(&k);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id.as_str(), "m1");
        assert_eq!(messages[1].content, "Which database should we use?");
        assert!(messages[1].id.is_placeholder());
    }

    #[test]
    fn failed_send_keeps_user_message_and_adds_error_bubble() {
        let mut mgr = ChatSessionManager::new();
        let k = key(AgentKind::CodeAnalysis, "p1");

        mgr.append_local(k.clone(), "Analyze the repo");
        mgr.append_error(k.clone(), "network error");

        let messages = mgr.messages(&k);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert!(messages[1].content.contains("network error"));
    }

    #[test]
    fn sessions_are_independent_per_agent_and_context() {
        let mut mgr = ChatSessionManager::new();
        let docs_p1 = key(AgentKind::DocumentQa, "p1");
        let docs_p2 = key(AgentKind::DocumentQa, "p2");
        let code_p1 = key(AgentKind::CodeAnalysis, "p1");

        mgr.append_local(docs_p1.clone(), "one");
        mgr.append_local(docs_p2.clone(), "two");
        mgr.append_local(code_p1.clone(), "three");

        assert_eq!(mgr.messages(&docs_p1).len(), 1);
        assert_eq!(mgr.messages(&docs_p2).len(), 1);
        assert_eq!(mgr.messages(&code_p1).len(), 1);
    }

    #[test]
    fn clear_empties_only_that_session() {
        let mut mgr = ChatSessionManager::new();
        let docs = key(AgentKind::DocumentQa, "p1");
        let team = key(AgentKind::TeamFormation, "p1");

        mgr.append_local(docs.clone(), "hello");
        mgr.append_local(team.clone(), "form a team");
        mgr.clear(&docs);

        assert!(mgr.messages(&docs).is_empty());
        assert_eq!(mgr.messages(&team).len(), 1);
    }

    #[test]
    fn appended_messages_keep_insertion_order() {
        let mut mgr = ChatSessionManager::new();
        let k = key(AgentKind::DocumentQa, "p1");
        mgr.append_local(k.clone(), "q1");
        mgr.append_remote(k.clone(), "a1");
        mgr.append_local(k.clone(), "q2");

        let contents: Vec<_> = mgr.messages(&k).iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2"]);
    }

    #[test]
    fn lead_context_is_a_valid_fallback() {
        let mut mgr = ChatSessionManager::new();
        let k = SessionKey {
            agent: AgentKind::TeamFormation,
            context: ContextId::Lead(EntityId::new("lead-1")),
        };
        mgr.append_local(k.clone(), "no project selected");
        assert_eq!(mgr.messages(&k).len(), 1);
        assert_eq!(k.context.id().as_str(), "lead-1");
    }
}
