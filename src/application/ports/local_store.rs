use crate::domain::entities::{StoreStats, Task, TaskChanges, TaskDraft};
use crate::domain::value_objects::TaskId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable local task storage: cache of the server's list plus the outbox of
/// locally created, not-yet-pushed records. Must survive process restarts.
#[async_trait]
pub trait LocalTaskStore: Send + Sync {
    /// Idempotent upsert by id: an existing id is overwritten, never
    /// duplicated.
    async fn put(&self, task: &Task) -> Result<(), AppError>;

    /// Persist a draft as a new local record. Assigns a fresh local id that
    /// is strictly greater than any id this store issued before.
    async fn create_local(&self, draft: TaskDraft) -> Result<Task, AppError>;

    /// All tasks, newest-first by creation time.
    async fn get_all(&self) -> Result<Vec<Task>, AppError>;

    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, AppError>;

    async fn update(&self, id: TaskId, changes: &TaskChanges) -> Result<Task, AppError>;

    /// Returns whether a record with this id existed.
    async fn delete(&self, id: TaskId) -> Result<bool, AppError>;

    /// The pending outbox, oldest-first.
    async fn get_unsynced(&self) -> Result<Vec<Task>, AppError>;

    async fn mark_synced(&self, ids: &[TaskId]) -> Result<(), AppError>;

    /// Case-insensitive match on title and description.
    async fn search(&self, query: &str) -> Result<Vec<Task>, AppError>;

    async fn stats(&self) -> Result<StoreStats, AppError>;

    async fn clear(&self) -> Result<(), AppError>;
}
