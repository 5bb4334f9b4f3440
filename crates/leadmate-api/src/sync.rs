//! Async driver tying the optimistic mutation engine to the REST client.
//!
//! `Dashboard` owns the entity store, the chat sessions, the session
//! context, and one mutation coordinator per collection. Every mutating
//! method follows the same shape: submit to the coordinator (optimistic
//! state applies synchronously), perform the dispatched request, settle the
//! ticket, then drive whatever follow-up dispatch the settle produced (a
//! queued mutation or a deferred delete). One request per dispatch, no
//! automatic retry, no client-side timeout.

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::types::{ChatContext, FilePart, NewProject, ProjectPatch};
use chrono::{DateTime, Utc};
use leadmate_core::chat::{ChatSessionManager, ContextId, SessionKey};
use leadmate_core::document::Document;
use leadmate_core::mutation::{Confirmation, Coordinator, Dispatch, Mutation, Request, Submission};
use leadmate_core::project::Project;
use leadmate_core::session::SessionContext;
use leadmate_core::store::EntityStore;
use leadmate_core::task::Task;
use leadmate_core::types::{AgentKind, EntityId, TaskStatus};
use leadmate_core::views::{self, DashboardStats};
use leadmate_core::LeadMateError;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub struct Dashboard {
    pub store: EntityStore,
    pub chats: ChatSessionManager,
    pub session: SessionContext,
    client: ApiClient,
    projects: Coordinator<Project>,
    tasks: Coordinator<Task>,
    documents: Coordinator<Document>,
}

impl Dashboard {
    pub fn new(client: ApiClient) -> Self {
        Self {
            store: EntityStore::new(),
            chats: ChatSessionManager::new(),
            session: SessionContext::new(),
            client,
            projects: Coordinator::new(),
            tasks: Coordinator::new(),
            documents: Coordinator::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // ---------------------------------------------------------------------------
    // Auth
    // ---------------------------------------------------------------------------

    /// Exchange credentials for a token and resolve the user record.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let token = self.client.login(email, password).await?;
        self.client.set_token(&token);
        let user = self.client.whoami().await?;
        self.session.login(token, user);
        Ok(())
    }

    /// Restore a previously issued token (e.g. from the CLI token store).
    pub async fn resume(&mut self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        self.client.set_token(&token);
        let user = self.client.whoami().await?;
        self.session.login(token, user);
        Ok(())
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.client.clear_token();
    }

    // ---------------------------------------------------------------------------
    // Loads
    // ---------------------------------------------------------------------------

    pub async fn refresh_projects(&mut self) -> Result<()> {
        let projects = self.client.list_projects().await?;
        self.store.projects.replace_all(projects);
        Ok(())
    }

    pub async fn refresh_tasks(&mut self) -> Result<()> {
        let user = self.session.user()?.clone();
        let tasks = self.client.list_tasks(&user.company_id, &user.id).await?;
        self.store.tasks.replace_all(tasks);
        Ok(())
    }

    pub async fn refresh_documents(&mut self, project: &EntityId) -> Result<()> {
        let documents = self.client.list_documents(project).await?;
        self.store.documents.replace_all(documents);
        Ok(())
    }

    pub async fn refresh_members(&mut self, project: &EntityId) -> Result<()> {
        let members = self.client.list_members(project).await?;
        self.store.members.replace_all(members);
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Project mutations
    // ---------------------------------------------------------------------------

    /// Create a project optimistically; resolves to the server-assigned id.
    pub async fn create_project(&mut self, new: NewProject) -> Result<EntityId> {
        let placeholder = self.projects.placeholder_id();
        let draft = new.into_project(placeholder);
        let submission = self
            .projects
            .submit(&mut self.store.projects, Mutation::Create(draft))
            .map_err(ApiError::from)?;
        let created = self.drive_projects(submission).await?;
        created.ok_or_else(|| ApiError::Decode("create settled without a server id".to_string()))
    }

    pub async fn update_project(&mut self, id: &EntityId, patch: ProjectPatch) -> Result<()> {
        let current = self
            .store
            .projects
            .get(id)
            .cloned()
            .ok_or_else(|| LeadMateError::ProjectNotFound(id.to_string()))
            .map_err(ApiError::from)?;
        let submission = self
            .projects
            .submit(&mut self.store.projects, Mutation::Update(patch.apply_to(current)))
            .map_err(ApiError::from)?;
        self.drive_projects(submission).await.map(drop)
    }

    pub async fn delete_project(&mut self, id: EntityId) -> Result<()> {
        let submission = self
            .projects
            .submit(&mut self.store.projects, Mutation::Delete(id))
            .map_err(ApiError::from)?;
        self.drive_projects(submission).await.map(drop)
    }

    async fn drive_projects(&mut self, submission: Submission<Project>) -> Result<Option<EntityId>> {
        let mut next = first_dispatch(submission);
        let mut created = None;
        let mut own = true;
        let mut first_error: Option<ApiError> = None;

        while let Some(dispatch) = next.take() {
            let outcome = match &dispatch.request {
                Request::Create(project) => {
                    let new = NewProject {
                        title: project.title.clone(),
                        description: project.description.clone(),
                        deadline: project.deadline,
                        team_lead_id: project.team_lead_id.clone(),
                    };
                    self.client.create_project(&new).await.map(Confirmation::Created)
                }
                Request::Update(project) => self
                    .client
                    .update_project(&project.id, &ProjectPatch::from_entity(project))
                    .await
                    .map(|_| Confirmation::Updated),
                Request::Delete(id) => self
                    .client
                    .delete_project(id)
                    .await
                    .map(|_| Confirmation::Deleted),
            };

            let completion = match outcome {
                Ok(confirmation) => {
                    if own {
                        if let Confirmation::Created(server) = &confirmation {
                            created = Some(server.id.clone());
                        }
                    }
                    self.projects
                        .commit(&mut self.store.projects, dispatch.ticket, confirmation)
                        .map_err(ApiError::from)?
                }
                Err(e) => {
                    let completion = self
                        .projects
                        .reject(&mut self.store.projects, dispatch.ticket)
                        .map_err(ApiError::from)?;
                    debug!(ticket = dispatch.ticket, "project mutation reverted");
                    if first_error.is_none() {
                        first_error = Some(e);
                    } else {
                        warn!(error = %e, "follow-up project mutation failed");
                    }
                    completion
                }
            };
            next = completion.follow_up;
            own = false;
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(created),
        }
    }

    // ---------------------------------------------------------------------------
    // Task board
    // ---------------------------------------------------------------------------

    /// Drag-and-drop status transition: the card moves instantly and moves
    /// back to its exact prior column if the backend refuses.
    pub async fn move_task(&mut self, id: &EntityId, status: TaskStatus) -> Result<()> {
        let moved = self
            .store
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| LeadMateError::TaskNotFound(id.to_string()))
            .map_err(ApiError::from)?
            .with_status(status);
        let submission = self
            .tasks
            .submit(&mut self.store.tasks, Mutation::Update(moved))
            .map_err(ApiError::from)?;

        let mut next = first_dispatch(submission);
        let mut first_error: Option<ApiError> = None;
        while let Some(dispatch) = next.take() {
            let outcome = match &dispatch.request {
                Request::Update(task) => self
                    .client
                    .update_task_status(&task.id, task.status)
                    .await
                    .map(|_| Confirmation::Updated),
                // tasks are created by the backend generator and never
                // deleted from this client
                Request::Create(_) | Request::Delete(_) => {
                    unreachable!("task coordinator only receives status updates")
                }
            };
            let completion = match outcome {
                Ok(confirmation) => self
                    .tasks
                    .commit(&mut self.store.tasks, dispatch.ticket, confirmation)
                    .map_err(ApiError::from)?,
                Err(e) => {
                    let completion = self
                        .tasks
                        .reject(&mut self.store.tasks, dispatch.ticket)
                        .map_err(ApiError::from)?;
                    if first_error.is_none() {
                        first_error = Some(e);
                    } else {
                        warn!(error = %e, "follow-up task mutation failed");
                    }
                    completion
                }
            };
            next = completion.follow_up;
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Ask the backend to generate tasks for this lead; returns how many
    /// arrived. Generation is server-side, so the results are upserted
    /// rather than created optimistically.
    pub async fn generate_tasks(&mut self) -> Result<usize> {
        let user = self.session.user()?.clone();
        let tasks = self.client.generate_tasks(&user.company_id, &user.id).await?;
        let count = tasks.len();
        for task in tasks {
            self.store.tasks.upsert(task);
        }
        Ok(count)
    }

    // ---------------------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------------------

    pub async fn upload_documents(
        &mut self,
        project: &EntityId,
        files: Vec<FilePart>,
    ) -> Result<usize> {
        let documents = self.client.upload_documents(project, files).await?;
        let count = documents.len();
        for document in documents {
            self.store.documents.upsert(document);
        }
        Ok(count)
    }

    /// Optimistic delete: the row disappears immediately and reappears in
    /// its exact prior position if the backend refuses.
    pub async fn delete_document(&mut self, id: EntityId) -> Result<()> {
        let submission = self
            .documents
            .submit(&mut self.store.documents, Mutation::Delete(id))
            .map_err(ApiError::from)?;

        let mut next = first_dispatch(submission);
        while let Some(dispatch) = next.take() {
            let outcome = match &dispatch.request {
                Request::Delete(id) => self
                    .client
                    .delete_document(id)
                    .await
                    .map(|_| Confirmation::Deleted),
                // documents are uploaded whole and never edited
                Request::Create(_) | Request::Update(_) => {
                    unreachable!("document coordinator only receives deletes")
                }
            };
            let completion = match outcome {
                Ok(confirmation) => self
                    .documents
                    .commit(&mut self.store.documents, dispatch.ticket, confirmation)
                    .map_err(ApiError::from)?,
                Err(e) => {
                    self.documents
                        .reject(&mut self.store.documents, dispatch.ticket)
                        .map_err(ApiError::from)?;
                    return Err(e);
                }
            };
            next = completion.follow_up;
        }
        Ok(())
    }

    pub async fn sync_documents(&self, project: &EntityId) -> Result<()> {
        self.client.sync_documents(project).await
    }

    // ---------------------------------------------------------------------------
    // Team
    // ---------------------------------------------------------------------------

    pub async fn add_member(&mut self, project: &EntityId, resume: FilePart) -> Result<EntityId> {
        let member = self.client.upload_resume(project, resume).await?;
        let id = member.id.clone();
        self.store.members.upsert(member);
        Ok(id)
    }

    // ---------------------------------------------------------------------------
    // Chat
    // ---------------------------------------------------------------------------

    /// Session key for an agent conversation: scoped to the given project,
    /// falling back to the lead's own id.
    pub fn chat_key(&self, agent: AgentKind, project: Option<EntityId>) -> Result<SessionKey> {
        let user = self.session.user().map_err(ApiError::from)?;
        let context = match project {
            Some(id) => ContextId::Project(id),
            None => ContextId::Lead(user.id.clone()),
        };
        Ok(SessionKey { agent, context })
    }

    /// Open a session and merge its server history. Merging twice is
    /// harmless; local pending messages survive the merge.
    pub async fn open_chat(
        &mut self,
        agent: AgentKind,
        project: Option<EntityId>,
    ) -> Result<SessionKey> {
        let key = self.chat_key(agent, project)?;
        self.chats.open(key.clone());
        let company = self.session.company_id().map_err(ApiError::from)?.clone();
        let history = self
            .client
            .chat_history(agent, &company, key.context.id())
            .await?;
        self.chats.merge_history(key.clone(), history);
        Ok(key)
    }

    /// Send a message to an agent. The user's message is appended before
    /// the request and is never rolled back; a failed send appends a
    /// visible assistant-role error bubble instead.
    pub async fn send_chat(
        &mut self,
        agent: AgentKind,
        project: Option<EntityId>,
        text: &str,
    ) -> Result<String> {
        let key = self.chat_key(agent, project.clone())?;
        self.chats.append_local(key.clone(), text);

        let user = self.session.user().map_err(ApiError::from)?.clone();
        let context = ChatContext {
            company_id: user.company_id.clone(),
            lead_id: user.id.clone(),
            project_id: project,
        };
        match self.client.send_chat(agent, text, &context).await {
            Ok(reply) => {
                self.chats.append_remote(key, reply.clone());
                Ok(reply)
            }
            Err(e) => {
                self.chats.append_error(key, e.to_string());
                Err(e)
            }
        }
    }

    pub fn clear_chat(&mut self, agent: AgentKind, project: Option<EntityId>) -> Result<()> {
        let key = self.chat_key(agent, project)?;
        self.chats.clear(&key);
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Derived views
    // ---------------------------------------------------------------------------

    pub fn stats(&self, now: DateTime<Utc>) -> DashboardStats {
        views::dashboard_stats(&self.store, now)
    }
}

fn first_dispatch<T>(submission: Submission<T>) -> Option<Dispatch<T>> {
    match submission {
        Submission::Dispatch(dispatch) => Some(dispatch),
        Submission::Queued | Submission::Settled => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
