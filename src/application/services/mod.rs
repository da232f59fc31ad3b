pub mod task_sync_service;

pub use task_sync_service::{SyncStatus, TaskSyncService, TaskSyncServiceTrait};
