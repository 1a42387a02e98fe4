use chrono::{DateTime, Utc};
use serde_json::json;

use crate::api::{ApiClient, Session};
use crate::core::task::{Task, TaskDraft, TaskId, TaskStatus, validate_title};
use crate::core::view::{Dashboard, DashboardLimits, ViewParameters, filter_and_sort};
use crate::error::{Error, Result};

/// Identifies one task-list fetch. Only the newest ticket may update the cache.
///
/// `TaskService` awaits each fetch before starting the next, so tickets only
/// matter to callers that hold a `TaskCache` across overlapping fetches, for
/// example a front end that re-fetches on a timer while a mutation is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Local copy of the user's tasks, always replaced wholesale.
#[derive(Debug, Default)]
pub struct TaskCache {
    tasks: Vec<Task>,
    issued: u64,
    loaded: bool,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Replace the collection if `ticket` is the newest fetch. A response to a
    /// superseded fetch is dropped and `false` returned.
    pub fn apply(&mut self, ticket: FetchTicket, tasks: Vec<Task>) -> bool {
        if ticket.0 != self.issued {
            log::debug!(
                "Dropping stale task list (fetch {} superseded by {})",
                ticket.0,
                self.issued
            );
            return false;
        }
        self.tasks = tasks;
        self.loaded = true;
        true
    }

    /// Forget all tasks; any fetch still in flight becomes stale.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.loaded = false;
        self.issued += 1;
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }
}

/// Task operations against the backend. Every successful mutation is followed
/// by exactly one full re-fetch; a failed one leaves the cache untouched.
pub struct TaskService {
    client: ApiClient,
    session: Session,
    cache: TaskCache,
}

impl TaskService {
    pub fn new(client: ApiClient, session: Session) -> Self {
        Self {
            client,
            session,
            cache: TaskCache::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cache(&self) -> &TaskCache {
        &self.cache
    }

    pub fn tasks(&self) -> &[Task] {
        self.cache.tasks()
    }

    pub fn logout(&mut self) -> Option<String> {
        self.cache.clear();
        self.session.logout()
    }

    /// The session is already expired by the client on a 401; the cached
    /// tasks go with it, whichever call saw the failure.
    fn forget_on_auth_failure<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.as_ref().is_err_and(|e| e.is_auth()) {
            self.cache.clear();
        }
        result
    }

    pub async fn refresh(&mut self) -> Result<&[Task]> {
        let ticket = self.cache.begin_fetch();
        let result = self.client.list_tasks(&mut self.session).await;
        let tasks = self.forget_on_auth_failure(result)?;
        self.cache.apply(ticket, tasks);
        Ok(self.cache.tasks())
    }

    pub async fn create_task(&mut self, draft: &TaskDraft) -> Result<()> {
        draft.validate()?;
        let result = self.client.create_task(&mut self.session, draft).await;
        self.forget_on_auth_failure(result)?;
        self.refresh().await?;
        Ok(())
    }

    /// Send the full edited task.
    pub async fn update_task(&mut self, task: &Task) -> Result<()> {
        validate_title(&task.title)?;
        let result = self
            .client
            .update_task(&mut self.session, &task.id, task)
            .await;
        self.forget_on_auth_failure(result)?;
        self.refresh().await?;
        Ok(())
    }

    /// Change one task's status, sending the cached task with the new status.
    pub async fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<()> {
        let payload = self
            .cache
            .find(id)
            .map(|t| t.with_status(status))
            .ok_or_else(|| Error::Validation(format!("No task with id {}", id)))?;
        self.update_task(&payload).await
    }

    /// Quick "mark done": only the status field is sent.
    pub async fn complete_task(&mut self, id: &TaskId) -> Result<()> {
        let payload = json!({ "status": TaskStatus::Completed.as_wire() });
        let result = self.client.update_task(&mut self.session, id, &payload).await;
        self.forget_on_auth_failure(result)?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn delete_task(&mut self, id: &TaskId) -> Result<()> {
        let result = self.client.delete_task(&mut self.session, id).await;
        self.forget_on_auth_failure(result)?;
        self.refresh().await?;
        Ok(())
    }

    pub fn view(&self, params: &ViewParameters) -> Vec<&Task> {
        filter_and_sort(self.cache.tasks(), params)
    }

    pub fn dashboard(&self, now: DateTime<Utc>, limits: DashboardLimits) -> Dashboard<'_> {
        Dashboard::build(self.cache.tasks(), now, limits)
    }
}
