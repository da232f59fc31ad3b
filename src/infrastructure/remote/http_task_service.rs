use crate::application::ports::RemoteTaskService;
use crate::domain::entities::{Task, TaskChanges, TaskDraft};
use crate::domain::value_objects::TaskId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::envelope::{ApiEnvelope, SyncEnvelope};
use super::error::RemoteServiceError;
use super::wire::{CreateTaskBody, SyncRequestBody, TaskPayload, UpdateTaskBody};

/// `RemoteTaskService` over the REST surface. Stateless apart from the
/// connection pool inside the reqwest client; transport default timeouts.
pub struct HttpTaskService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RemoteServiceError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteServiceError::NotFound(
                "the server does not hold this record".to_string(),
            ));
        }
        let envelope: ApiEnvelope<T> = response.json().await.map_err(|err| {
            if status.is_success() {
                RemoteServiceError::Transport(err)
            } else {
                RemoteServiceError::Rejected(format!("HTTP {}", status))
            }
        })?;
        envelope.into_data()
    }

    fn collect_tasks(payloads: Vec<TaskPayload>) -> Result<Vec<Task>, RemoteServiceError> {
        payloads
            .into_iter()
            .map(TaskPayload::into_task)
            .collect()
    }
}

#[async_trait]
impl RemoteTaskService for HttpTaskService {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, AppError> {
        let response = self.client.get(self.url("/tasks")).send().await?;
        let payloads: Vec<TaskPayload> = Self::read_envelope(response).await?;
        Ok(Self::collect_tasks(payloads)?)
    }

    async fn fetch_task(&self, id: TaskId) -> Result<Task, AppError> {
        let response = self
            .client
            .get(self.url(&format!("/tasks/{}", id)))
            .send()
            .await?;
        let payload: TaskPayload = Self::read_envelope(response).await?;
        Ok(payload.into_task()?)
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, AppError> {
        tracing::debug!("Creating task '{}' on the server", draft.title);
        let response = self
            .client
            .post(self.url("/tasks"))
            .json(&CreateTaskBody::from_draft(draft))
            .send()
            .await?;
        let payload: TaskPayload = Self::read_envelope(response).await?;
        Ok(payload.into_task()?)
    }

    async fn update_task(&self, id: TaskId, changes: &TaskChanges) -> Result<Task, AppError> {
        let response = self
            .client
            .put(self.url(&format!("/tasks/{}", id)))
            .json(&UpdateTaskBody::from_changes(changes))
            .send()
            .await?;
        let payload: TaskPayload = Self::read_envelope(response).await?;
        Ok(payload.into_task()?)
    }

    async fn delete_task(&self, id: TaskId) -> Result<Task, AppError> {
        let response = self
            .client
            .delete(self.url(&format!("/tasks/{}", id)))
            .send()
            .await?;
        let payload: TaskPayload = Self::read_envelope(response).await?;
        Ok(payload.into_task()?)
    }

    async fn sync_tasks(&self, pending: &[Task]) -> Result<Vec<Task>, AppError> {
        tracing::debug!("Pushing {} pending task(s) to the server", pending.len());
        let body = SyncRequestBody {
            tasks: pending.iter().map(TaskPayload::from_task).collect(),
        };
        let response = self
            .client
            .post(self.url("/tasks/sync"))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let envelope: SyncEnvelope = response
            .json()
            .await
            .map_err(|err| {
                if status.is_success() {
                    RemoteServiceError::Transport(err)
                } else {
                    RemoteServiceError::Rejected(format!("HTTP {}", status))
                }
            })?;
        Ok(Self::collect_tasks(envelope.into_tasks()?)?)
    }
}
