use crate::application::services::task_sync_service::{SyncStatus, TaskSyncServiceTrait};
use crate::domain::entities::{StoreStats, SyncReport, TaskChanges, TaskDraft};
use crate::domain::value_objects::{GeoPoint, PhotoAttachment, TaskId, TaskTitle};
use crate::presentation::dto::task::{
    CreateTaskRequest, DeleteTaskResponse, LocationInput, SearchTasksRequest, TaskResponse,
    UpdateTaskRequest,
};
use crate::presentation::dto::Validate;
use crate::shared::error::AppError;
use std::sync::Arc;

/// The one entry point a UI layer calls. Validates requests before any store
/// is touched, then delegates to the sync core and maps results back to wire
/// shapes.
pub struct TaskHandler {
    sync_service: Arc<dyn TaskSyncServiceTrait>,
}

impl TaskHandler {
    pub fn new(sync_service: Arc<dyn TaskSyncServiceTrait>) -> Self {
        Self { sync_service }
    }

    pub async fn load_tasks(&self) -> Result<Vec<TaskResponse>, AppError> {
        let tasks = self.sync_service.load().await?;
        Ok(tasks.iter().map(TaskResponse::from_task).collect())
    }

    /// Current working set without touching either store.
    pub async fn current_tasks(&self) -> Vec<TaskResponse> {
        self.sync_service
            .tasks()
            .await
            .iter()
            .map(TaskResponse::from_task)
            .collect()
    }

    pub async fn create_task(&self, request: CreateTaskRequest) -> Result<TaskResponse, AppError> {
        request.validate().map_err(AppError::ValidationError)?;
        let draft = draft_from_request(request)?;
        let task = self.sync_service.create(draft).await?;
        Ok(TaskResponse::from_task(&task))
    }

    pub async fn get_task(&self, id: i64) -> Result<Option<TaskResponse>, AppError> {
        let task = self.sync_service.get(TaskId::new(id)).await?;
        Ok(task.as_ref().map(TaskResponse::from_task))
    }

    pub async fn update_task(
        &self,
        id: i64,
        request: UpdateTaskRequest,
    ) -> Result<TaskResponse, AppError> {
        request.validate().map_err(AppError::ValidationError)?;
        let changes = changes_from_request(request)?;
        let task = self.sync_service.update(TaskId::new(id), changes).await?;
        Ok(TaskResponse::from_task(&task))
    }

    pub async fn delete_task(&self, id: i64) -> Result<DeleteTaskResponse, AppError> {
        let removed = self.sync_service.delete(TaskId::new(id)).await?;
        Ok(DeleteTaskResponse { id, removed })
    }

    pub async fn search_tasks(
        &self,
        request: SearchTasksRequest,
    ) -> Result<Vec<TaskResponse>, AppError> {
        request.validate().map_err(AppError::ValidationError)?;
        let tasks = self.sync_service.search(request.query.trim()).await?;
        Ok(tasks.iter().map(TaskResponse::from_task).collect())
    }

    pub async fn task_stats(&self) -> Result<StoreStats, AppError> {
        self.sync_service.stats().await
    }

    pub async fn sync_now(&self) -> Result<SyncReport, AppError> {
        self.sync_service.sync_pending().await
    }

    pub async fn sync_status(&self) -> SyncStatus {
        self.sync_service.status().await
    }
}

fn draft_from_request(request: CreateTaskRequest) -> Result<TaskDraft, AppError> {
    let title = TaskTitle::new(request.title).map_err(AppError::ValidationError)?;
    let mut draft = TaskDraft::new(title);
    if let Some(description) = request.description.filter(|d| !d.trim().is_empty()) {
        draft = draft.with_description(description);
    }
    if let Some(location) = request.location {
        draft = draft.with_location(parse_location(location)?);
    }
    if let Some(photo) = request.photo {
        draft = draft.with_photo(
            PhotoAttachment::new(photo, request.photo_name).map_err(AppError::ValidationError)?,
        );
    }
    Ok(draft)
}

fn changes_from_request(request: UpdateTaskRequest) -> Result<TaskChanges, AppError> {
    let mut changes = TaskChanges::default();
    if let Some(title) = request.title {
        changes.title = Some(TaskTitle::new(title).map_err(AppError::ValidationError)?);
    }
    changes.description = request.description;
    if let Some(location) = request.location {
        changes.location = Some(parse_location(location)?);
    }
    if let Some(photo) = request.photo {
        changes.photo = Some(
            PhotoAttachment::new(photo, request.photo_name).map_err(AppError::ValidationError)?,
        );
    }
    Ok(changes)
}

fn parse_location(input: LocationInput) -> Result<GeoPoint, AppError> {
    let mut point =
        GeoPoint::new(input.latitude, input.longitude).map_err(AppError::ValidationError)?;
    point.accuracy = input.accuracy;
    point.timestamp = input.timestamp;
    Ok(point)
}
