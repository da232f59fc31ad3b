use crate::domain::entities::{Task, TaskChanges, TaskDraft};
use crate::domain::value_objects::TaskId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// REST CRUD against the server holding the canonical task list, plus the
/// bulk endpoint replaying locally created records. Every response carries a
/// success flag; absence of success is a failure regardless of HTTP status
/// nuance.
#[async_trait]
pub trait RemoteTaskService: Send + Sync {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, AppError>;

    async fn fetch_task(&self, id: TaskId) -> Result<Task, AppError>;

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, AppError>;

    async fn update_task(&self, id: TaskId, changes: &TaskChanges) -> Result<Task, AppError>;

    /// Returns the deleted record as reported by the server.
    async fn delete_task(&self, id: TaskId) -> Result<Task, AppError>;

    /// Pushes the whole pending batch in one request and returns the
    /// server's current full list.
    async fn sync_tasks(&self, pending: &[Task]) -> Result<Vec<Task>, AppError>;
}
