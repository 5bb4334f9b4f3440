//! Typed driver for the LeadMate backend's REST contract.
//!
//! One method per backend operation; every call attaches the bearer token
//! when present, checks the status, and normalizes the body through
//! [`crate::decode`] before anything reaches the entity store.

use crate::decode;
use crate::error::{ApiError, Result};
use crate::types::{ChatContext, FilePart, LoginRequest, NewProject, ProjectPatch};
use leadmate_core::chat::ChatMessage;
use leadmate_core::document::Document;
use leadmate_core::project::Project;
use leadmate_core::session::UserProfile;
use leadmate_core::task::Task;
use leadmate_core::team::TeamMember;
use leadmate_core::types::{AgentKind, EntityId, TaskStatus};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // ---------------------------------------------------------------------------
    // Auth
    // ---------------------------------------------------------------------------

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let body = self
            .send(
                self.request(Method::POST, "/api/auth/login")
                    .json(&LoginRequest { email, password }),
            )
            .await?;
        decode::string_field(&body, &["token", "access_token"])
            .ok_or_else(|| ApiError::Decode("login response carried no token".to_string()))
    }

    /// Resolve the current token to a user record. The returned
    /// `company_id` is the tenancy key for chat and task operations.
    pub async fn whoami(&self) -> Result<UserProfile> {
        let body = self.send(self.request(Method::GET, "/api/auth/me")).await?;
        decode::item(body, "user")
    }

    // ---------------------------------------------------------------------------
    // Projects
    // ---------------------------------------------------------------------------

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let body = self.send(self.request(Method::GET, "/api/projects")).await?;
        Ok(decode::list(body, "projects"))
    }

    pub async fn create_project(&self, new: &NewProject) -> Result<Project> {
        let body = self
            .send(self.request(Method::POST, "/api/projects").json(new))
            .await?;
        decode::item(body, "project")
    }

    pub async fn update_project(&self, id: &EntityId, patch: &ProjectPatch) -> Result<()> {
        self.send(
            self.request(Method::PATCH, &format!("/api/projects/{id}"))
                .json(patch),
        )
        .await
        .map(drop)
    }

    pub async fn delete_project(&self, id: &EntityId) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("/api/projects/{id}")))
            .await
            .map(drop)
    }

    // ---------------------------------------------------------------------------
    // Tasks
    // ---------------------------------------------------------------------------

    pub async fn list_tasks(&self, company: &EntityId, lead: &EntityId) -> Result<Vec<Task>> {
        let body = self
            .send(
                self.request(Method::GET, "/api/tasks")
                    .query(&[("company", company.as_str()), ("lead", lead.as_str())]),
            )
            .await?;
        Ok(decode::list(body, "tasks"))
    }

    /// Ask the backend to generate a task list for this context. Returns the
    /// freshly created tasks.
    pub async fn generate_tasks(&self, company: &EntityId, lead: &EntityId) -> Result<Vec<Task>> {
        let body = self
            .send(
                self.request(Method::POST, "/api/tasks/generate")
                    .json(&json!({ "company_id": company, "lead_id": lead })),
            )
            .await?;
        Ok(decode::list(body, "tasks"))
    }

    pub async fn update_task_status(&self, id: &EntityId, status: TaskStatus) -> Result<()> {
        self.send(
            self.request(Method::PATCH, &format!("/api/tasks/{id}/status"))
                .json(&json!({ "status": status })),
        )
        .await
        .map(drop)
    }

    // ---------------------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------------------

    pub async fn list_documents(&self, project: &EntityId) -> Result<Vec<Document>> {
        let body = self
            .send(self.request(Method::GET, &format!("/api/projects/{project}/documents")))
            .await?;
        Ok(decode::list(body, "documents"))
    }

    /// Multipart upload of one or more files under a project.
    pub async fn upload_documents(
        &self,
        project: &EntityId,
        files: Vec<FilePart>,
    ) -> Result<Vec<Document>> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.filename)
                .mime_str(&file.content_type)?;
            form = form.part("files", part);
        }
        let body = self
            .send(
                self.request(Method::POST, &format!("/api/projects/{project}/documents"))
                    .multipart(form),
            )
            .await?;
        Ok(decode::list(body, "documents"))
    }

    pub async fn delete_document(&self, id: &EntityId) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("/api/documents/{id}")))
            .await
            .map(drop)
    }

    /// Trigger backend re-analysis of a project's documents.
    pub async fn sync_documents(&self, project: &EntityId) -> Result<()> {
        self.send(self.request(Method::POST, &format!("/api/projects/{project}/documents/sync")))
            .await
            .map(drop)
    }

    // ---------------------------------------------------------------------------
    // Team
    // ---------------------------------------------------------------------------

    pub async fn list_members(&self, project: &EntityId) -> Result<Vec<TeamMember>> {
        let body = self
            .send(self.request(Method::GET, &format!("/api/projects/{project}/team")))
            .await?;
        Ok(decode::list(body, "members"))
    }

    /// Upload a resume; the backend parses it into a member record.
    pub async fn upload_resume(&self, project: &EntityId, file: FilePart) -> Result<TeamMember> {
        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&file.content_type)?;
        let form = Form::new().part("resume", part);
        let body = self
            .send(
                self.request(Method::POST, &format!("/api/projects/{project}/team/resume"))
                    .multipart(form),
            )
            .await?;
        decode::item(body, "member")
    }

    // ---------------------------------------------------------------------------
    // Chat
    // ---------------------------------------------------------------------------

    /// Send one message to an agent endpoint; returns the assistant reply.
    pub async fn send_chat(
        &self,
        agent: AgentKind,
        message: &str,
        context: &ChatContext,
    ) -> Result<String> {
        let body = self
            .send(
                self.request(Method::POST, &format!("/api/agents/{agent}/chat"))
                    .json(&json!({
                        "message": message,
                        "company_id": context.company_id,
                        "lead_id": context.lead_id,
                        "project_id": context.project_id,
                    })),
            )
            .await?;
        decode::string_field(&body, &["reply", "response", "message"])
            .ok_or_else(|| ApiError::Decode("chat response carried no reply".to_string()))
    }

    pub async fn chat_history(
        &self,
        agent: AgentKind,
        company: &EntityId,
        context: &EntityId,
    ) -> Result<Vec<ChatMessage>> {
        let body = self
            .send(
                self.request(Method::GET, &format!("/api/agents/{agent}/history"))
                    .query(&[("company", company.as_str()), ("context", context.as_str())]),
            )
            .await?;
        Ok(decode::list(body, "messages"))
    }

    // ---------------------------------------------------------------------------
    // Plumbing
    // ---------------------------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<Value>().await {
                Ok(body) => decode::string_field(&body, &["message", "error", "detail"])
                    .unwrap_or_else(|| "request failed".to_string()),
                Err(_) => "request failed".to_string(),
            };
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn bearer_token_is_attached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/projects")
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).with_token("tok-123");
        let projects = client.list_projects().await.unwrap();
        assert!(projects.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejection_message_is_surfaced_verbatim() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/projects/p1")
            .with_status(409)
            .with_body(json!({ "message": "project has open tasks" }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.delete_project(&EntityId::new("p1")).await.unwrap_err();
        match err {
            ApiError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "project has open tasks");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejection_without_body_uses_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/projects")
            .with_status(500)
            .with_body("")
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.list_projects().await.unwrap_err();
        match err {
            ApiError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "request failed");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_accepts_wrapped_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tasks")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                json!({ "tasks": [{ "id": "t1", "title": "A", "status": "todo" }] }).to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let tasks = client
            .list_tasks(&EntityId::new("c1"), &EntityId::new("u1"))
            .await
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id.as_str(), "t1");
    }

    #[tokio::test]
    async fn login_extracts_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_status(200)
            .with_body(json!({ "access_token": "tok-9" }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let token = client.login("a@b.c", "hunter2").await.unwrap();
        assert_eq!(token, "tok-9");
    }

    #[tokio::test]
    async fn chat_reply_is_extracted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/agents/tech_stack/chat")
            .with_status(200)
            .with_body(json!({ "reply": "Use PostgreSQL." }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let context = ChatContext {
            company_id: EntityId::new("c1"),
            lead_id: EntityId::new("u1"),
            project_id: None,
        };
        let reply = client
            .send_chat(AgentKind::TechStack, "db?", &context)
            .await
            .unwrap();
        assert_eq!(reply, "Use PostgreSQL.");
    }

    #[tokio::test]
    async fn chat_history_decodes_messages() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/agents/document_qa/history")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "messages": [
                        { "id": "m1", "role": "user", "content": "hi",
                          "timestamp": "2026-08-01T10:00:00Z" },
                        { "id": "m2", "role": "assistant", "content": "hello",
                          "timestamp": "2026-08-01T10:00:05Z" }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let history = client
            .chat_history(AgentKind::DocumentQa, &EntityId::new("c1"), &EntityId::new("p1"))
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id.as_str(), "m1");
    }

    #[tokio::test]
    async fn empty_body_on_success_is_fine() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/api/tasks/t1/status")
            .with_status(204)
            .with_body("")
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        client
            .update_task_status(&EntityId::new("t1"), TaskStatus::Completed)
            .await
            .unwrap();
    }
}
