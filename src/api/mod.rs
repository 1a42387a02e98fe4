pub mod keyring;
pub mod session;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::core::account::{LoginForm, SignupForm};
use crate::core::task::{Task, TaskDraft, TaskId};
use crate::error::{Error, Result};
pub use session::Session;

const SIGNUP_CONFIRMATION: &str = "Account created successfully!";

/// Response envelope shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    tasks: Option<Vec<Task>>,
}

/// Client for the Finish-It REST API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create an account. Returns the confirmation shown to the user; the
    /// backend's own success message is only logged.
    pub async fn signup(&self, form: &SignupForm) -> Result<String> {
        form.validate()?;
        let request = self.http.post(self.url("/api/users/signup")).json(&form.request());
        let envelope = self
            .send(request, None, "Signup failed. Please try again.")
            .await?;
        log::info!(
            "Signed up {} ({})",
            form.email,
            envelope.message.as_deref().unwrap_or("no message")
        );
        Ok(SIGNUP_CONFIRMATION.to_string())
    }

    /// Exchange credentials for a token and open `session` with it.
    pub async fn login(&self, form: &LoginForm, session: &mut Session) -> Result<()> {
        let request = self.http.post(self.url("/api/users/login")).json(form);
        let envelope = self
            .send(request, None, "Login failed. Please try again.")
            .await?;
        let token = envelope
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Validation("Login response did not include a token".into()))?;
        session.open(token);
        log::info!("Logged in as {}", form.email);
        Ok(())
    }

    pub async fn list_tasks(&self, session: &mut Session) -> Result<Vec<Task>> {
        let request = self
            .http
            .get(self.url("/api/tasks"))
            .bearer_auth(session.bearer()?);
        let envelope = self
            .send(request, Some(session), "Failed to load tasks")
            .await?;
        let tasks = envelope
            .tasks
            .ok_or_else(|| Error::Validation("Server response error: task list missing".into()))?;
        log::debug!("Loaded {} tasks", tasks.len());
        Ok(tasks)
    }

    pub async fn create_task(&self, session: &mut Session, draft: &TaskDraft) -> Result<()> {
        draft.validate()?;
        let request = self
            .http
            .post(self.url("/api/tasks"))
            .bearer_auth(session.bearer()?)
            .json(draft);
        self.send(request, Some(session), "Failed to create task")
            .await?;
        log::info!("Created task: {}", draft.title);
        Ok(())
    }

    /// `PUT /api/tasks/{id}` with a full task or a partial JSON object.
    pub async fn update_task<P: Serialize + ?Sized>(
        &self,
        session: &mut Session,
        id: &TaskId,
        payload: &P,
    ) -> Result<()> {
        let request = self
            .http
            .put(self.url(&format!("/api/tasks/{}", id)))
            .bearer_auth(session.bearer()?)
            .json(payload);
        self.send(request, Some(session), "Failed to update task")
            .await?;
        log::info!("Updated task {}", id);
        Ok(())
    }

    pub async fn delete_task(&self, session: &mut Session, id: &TaskId) -> Result<()> {
        let request = self
            .http
            .delete(self.url(&format!("/api/tasks/{}", id)))
            .bearer_auth(session.bearer()?);
        self.send(request, Some(session), "Failed to delete task")
            .await?;
        log::info!("Deleted task {}", id);
        Ok(())
    }

    /// Send a request and unwrap the envelope. A 401 on an authenticated call
    /// expires `session`.
    async fn send(
        &self,
        request: RequestBuilder,
        session: Option<&mut Session>,
        fallback: &str,
    ) -> Result<Envelope> {
        let resp = request.send().await?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            if let Some(session) = session {
                session.expire();
                return Err(Error::Auth);
            }
        }

        let text = resp.text().await?;
        let envelope: Envelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                log::error!("Malformed response ({}): {}", e, text);
                return Err(Error::Validation(
                    "Server response error. Please try again.".into(),
                ));
            }
            Err(_) => {
                log::warn!("Request failed with {}: {}", status, text);
                return Err(Error::Http { status });
            }
        };

        if !envelope.success {
            let message = envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());
            log::warn!("Request rejected ({}): {}", status, message);
            return Err(Error::Rejected(message));
        }

        Ok(envelope)
    }
}
