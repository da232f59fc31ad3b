use crate::application::ports::connectivity::{
    ConnectivityEvent, ConnectivityMonitor, ConnectivityState,
};
use crate::application::ports::{LocalTaskStore, RemoteTaskService};
use crate::domain::entities::{StoreStats, SyncReport, Task, TaskChanges, TaskDraft};
use crate::domain::value_objects::TaskId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub last_sync: Option<i64>,
    pub sync_errors: u32,
}

#[async_trait]
pub trait TaskSyncServiceTrait: Send + Sync {
    async fn load(&self) -> Result<Vec<Task>, AppError>;
    async fn create(&self, draft: TaskDraft) -> Result<Task, AppError>;
    async fn get(&self, id: TaskId) -> Result<Option<Task>, AppError>;
    async fn update(&self, id: TaskId, changes: TaskChanges) -> Result<Task, AppError>;
    async fn delete(&self, id: TaskId) -> Result<bool, AppError>;
    async fn search(&self, query: &str) -> Result<Vec<Task>, AppError>;
    async fn stats(&self) -> Result<StoreStats, AppError>;
    async fn clear(&self) -> Result<(), AppError>;
    async fn sync_pending(&self) -> Result<SyncReport, AppError>;
    async fn handle_transition(&self, event: ConnectivityEvent) -> Result<(), AppError>;
    async fn tasks(&self) -> Vec<Task>;
    async fn status(&self) -> SyncStatus;
}

/// Decides, per operation, whether the server or the local store is
/// authoritative, mirrors remote reads into the local store, and replays the
/// pending outbox when connectivity returns.
pub struct TaskSyncService {
    remote: Arc<dyn RemoteTaskService>,
    local: Arc<dyn LocalTaskStore>,
    monitor: Arc<dyn ConnectivityMonitor>,
    online: RwLock<ConnectivityState>,
    working_set: RwLock<Vec<Task>>,
    status: RwLock<SyncStatus>,
    // Serializes mutating operations; the UI promises one logical write at a
    // time but the core does not rely on it.
    write_guard: Mutex<()>,
}

impl TaskSyncService {
    pub fn new(
        remote: Arc<dyn RemoteTaskService>,
        local: Arc<dyn LocalTaskStore>,
        monitor: Arc<dyn ConnectivityMonitor>,
    ) -> Self {
        let initial = monitor.current();
        Self {
            remote,
            local,
            monitor,
            online: RwLock::new(initial),
            working_set: RwLock::new(Vec::new()),
            status: RwLock::new(SyncStatus::default()),
            write_guard: Mutex::new(()),
        }
    }

    /// Drive transition handling from the monitor's event stream. Reconnect
    /// replay then happens without the host application calling
    /// `handle_transition` itself.
    pub fn spawn_connectivity_listener(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let service = Arc::clone(self);
        let mut rx = service.monitor.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let Err(err) = service.handle_transition(event).await {
                            tracing::error!("Connectivity transition handling failed: {}", err);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Connectivity event stream lagged, skipped {}", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    async fn is_online(&self) -> bool {
        self.online.read().await.is_online()
    }

    async fn replace_in_working_set(&self, task: Task) {
        let mut set = self.working_set.write().await;
        match set.iter_mut().find(|entry| entry.id == task.id) {
            Some(entry) => *entry = task,
            None => set.insert(0, task),
        }
    }

    async fn replay_outbox(&self) -> Result<SyncReport, AppError> {
        let pending = self.local.get_unsynced().await?;
        if pending.is_empty() {
            return Ok(SyncReport::empty());
        }

        let count = pending.len() as u32;
        match self.remote.sync_tasks(&pending).await {
            Ok(server_tasks) => {
                let ids: Vec<TaskId> = pending.iter().map(|task| task.id).collect();
                self.local.mark_synced(&ids).await?;
                tracing::info!(
                    "Pushed {} pending task(s), server now holds {}",
                    count,
                    server_tasks.len()
                );
                Ok(SyncReport {
                    synced_count: count,
                    failed_count: 0,
                    pending_count: 0,
                })
            }
            Err(err) => {
                tracing::warn!("Bulk sync failed, keeping {} task(s) pending: {}", count, err);
                Ok(SyncReport {
                    synced_count: 0,
                    failed_count: count,
                    pending_count: count,
                })
            }
        }
    }
}

#[async_trait]
impl TaskSyncServiceTrait for TaskSyncService {
    /// Fetch the authoritative list. Online, the remote list replaces the
    /// working set and is mirrored into the local store; any remote failure
    /// degrades to the (possibly stale) local list instead of surfacing.
    async fn load(&self) -> Result<Vec<Task>, AppError> {
        if self.is_online().await {
            match self.remote.fetch_tasks().await {
                Ok(mut tasks) => {
                    for task in &mut tasks {
                        task.mark_synced();
                        self.local.put(task).await?;
                    }
                    // The server reports insertion order; the UI contract is
                    // newest-first regardless of which store answered.
                    tasks.sort_by(|a, b| {
                        b.created_at
                            .cmp(&a.created_at)
                            .then_with(|| b.id.cmp(&a.id))
                    });
                    *self.working_set.write().await = tasks.clone();
                    return Ok(tasks);
                }
                Err(err) => {
                    tracing::warn!("Remote load failed, serving local data: {}", err);
                }
            }
        }

        let tasks = self.local.get_all().await?;
        *self.working_set.write().await = tasks.clone();
        Ok(tasks)
    }

    /// Create against whichever store is authoritative. A remote failure
    /// mid-request degrades to a local pending record; the write is never
    /// dropped.
    async fn create(&self, draft: TaskDraft) -> Result<Task, AppError> {
        let _guard = self.write_guard.lock().await;

        if self.is_online().await {
            match self.remote.create_task(&draft).await {
                Ok(mut task) => {
                    task.mark_synced();
                    self.local.put(&task).await?;
                    self.working_set.write().await.insert(0, task.clone());
                    return Ok(task);
                }
                Err(err) => {
                    tracing::warn!("Remote create failed, storing locally instead: {}", err);
                }
            }
        }

        let task = self.local.create_local(draft).await?;
        self.working_set.write().await.insert(0, task.clone());
        Ok(task)
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>, AppError> {
        if self.is_online().await {
            match self.remote.fetch_task(id).await {
                Ok(mut task) => {
                    task.mark_synced();
                    return Ok(Some(task));
                }
                Err(err) => {
                    tracing::warn!("Remote fetch of task {} failed, trying local: {}", id, err);
                }
            }
        }
        self.local.get_by_id(id).await
    }

    async fn update(&self, id: TaskId, changes: TaskChanges) -> Result<Task, AppError> {
        if changes.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let _guard = self.write_guard.lock().await;

        if self.is_online().await {
            match self.remote.update_task(id, &changes).await {
                Ok(mut task) => {
                    task.mark_synced();
                    self.local.put(&task).await?;
                    self.replace_in_working_set(task.clone()).await;
                    return Ok(task);
                }
                Err(err) => {
                    tracing::warn!("Remote update of task {} failed, updating locally: {}", id, err);
                }
            }
        }

        let task = self.local.update(id, &changes).await?;
        self.replace_in_working_set(task.clone()).await;
        Ok(task)
    }

    /// Local deletion is unconditional so the UI never shows a deleted task
    /// again, even when the remote delete fails.
    async fn delete(&self, id: TaskId) -> Result<bool, AppError> {
        let _guard = self.write_guard.lock().await;

        if self.is_online().await {
            if let Err(err) = self.remote.delete_task(id).await {
                tracing::warn!("Remote delete of task {} failed: {}", id, err);
            }
        }

        let removed = self.local.delete(id).await?;
        self.working_set.write().await.retain(|task| task.id != id);
        Ok(removed)
    }

    async fn search(&self, query: &str) -> Result<Vec<Task>, AppError> {
        self.local.search(query).await
    }

    async fn stats(&self) -> Result<StoreStats, AppError> {
        self.local.stats().await
    }

    async fn clear(&self) -> Result<(), AppError> {
        let _guard = self.write_guard.lock().await;
        self.local.clear().await?;
        self.working_set.write().await.clear();
        Ok(())
    }

    /// Replay the pending outbox as one bulk request. Single-flight: a call
    /// arriving while a replay runs is a no-op. Failures leave the batch
    /// pending for the next reconnect; there is no backoff.
    async fn sync_pending(&self) -> Result<SyncReport, AppError> {
        {
            let mut status = self.status.write().await;
            if status.is_syncing {
                return Ok(SyncReport::empty());
            }
            status.is_syncing = true;
        }

        let result = self.replay_outbox().await;

        let mut status = self.status.write().await;
        status.is_syncing = false;
        match &result {
            Ok(report) if report.failed_count == 0 => {
                status.last_sync = Some(chrono::Utc::now().timestamp());
            }
            _ => {
                status.sync_errors += 1;
            }
        }
        result
    }

    async fn handle_transition(&self, event: ConnectivityEvent) -> Result<(), AppError> {
        match event {
            ConnectivityEvent::CameOnline => {
                *self.online.write().await = ConnectivityState::Online;
                tracing::info!("Connectivity restored, replaying pending tasks");
                // Sync runs to completion before the refresh so freshly
                // pushed tasks appear in the reloaded list.
                self.sync_pending().await?;
                self.load().await?;
                Ok(())
            }
            ConnectivityEvent::WentOffline => {
                *self.online.write().await = ConnectivityState::Offline;
                tracing::info!("Connectivity lost, serving local data");
                Ok(())
            }
        }
    }

    async fn tasks(&self) -> Vec<Task> {
        self.working_set.read().await.clone()
    }

    async fn status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::TaskSource;
    use crate::domain::value_objects::TaskTitle;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};

    fn draft(title: &str) -> TaskDraft {
        TaskDraft::new(TaskTitle::new(title.to_string()).unwrap())
    }

    struct FakeLocalStore {
        tasks: std::sync::Mutex<Vec<Task>>,
        next_id: AtomicI64,
    }

    impl FakeLocalStore {
        fn new() -> Self {
            Self {
                tasks: std::sync::Mutex::new(Vec::new()),
                // Stands in for the clock-derived local id base.
                next_id: AtomicI64::new(1_700_000_000_000),
            }
        }

        fn snapshot(&self) -> Vec<Task> {
            self.tasks.lock().unwrap().clone()
        }

        fn newest_first(mut tasks: Vec<Task>) -> Vec<Task> {
            tasks.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
            tasks
        }
    }

    #[async_trait]
    impl LocalTaskStore for FakeLocalStore {
        async fn put(&self, task: &Task) -> Result<(), AppError> {
            let mut tasks = self.tasks.lock().unwrap();
            match tasks.iter_mut().find(|entry| entry.id == task.id) {
                Some(entry) => *entry = task.clone(),
                None => tasks.push(task.clone()),
            }
            Ok(())
        }

        async fn create_local(&self, draft: TaskDraft) -> Result<Task, AppError> {
            let id = TaskId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
            let task = Task::new_local(id, draft, Utc::now());
            self.tasks.lock().unwrap().push(task.clone());
            Ok(task)
        }

        async fn get_all(&self) -> Result<Vec<Task>, AppError> {
            Ok(Self::newest_first(self.snapshot()))
        }

        async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, AppError> {
            Ok(self.snapshot().into_iter().find(|task| task.id == id))
        }

        async fn update(&self, id: TaskId, changes: &TaskChanges) -> Result<Task, AppError> {
            let mut tasks = self.tasks.lock().unwrap();
            let task = tasks
                .iter_mut()
                .find(|entry| entry.id == id)
                .ok_or_else(|| AppError::NotFound(format!("task {}", id)))?;
            task.apply_changes(changes, Utc::now());
            Ok(task.clone())
        }

        async fn delete(&self, id: TaskId) -> Result<bool, AppError> {
            let mut tasks = self.tasks.lock().unwrap();
            let before = tasks.len();
            tasks.retain(|task| task.id != id);
            Ok(tasks.len() != before)
        }

        async fn get_unsynced(&self) -> Result<Vec<Task>, AppError> {
            let mut pending: Vec<Task> = self
                .snapshot()
                .into_iter()
                .filter(|task| task.is_pending())
                .collect();
            pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
            Ok(pending)
        }

        async fn mark_synced(&self, ids: &[TaskId]) -> Result<(), AppError> {
            let mut tasks = self.tasks.lock().unwrap();
            for task in tasks.iter_mut() {
                if ids.contains(&task.id) {
                    task.mark_synced();
                }
            }
            Ok(())
        }

        async fn search(&self, query: &str) -> Result<Vec<Task>, AppError> {
            let needle = query.to_lowercase();
            Ok(Self::newest_first(
                self.snapshot()
                    .into_iter()
                    .filter(|task| {
                        task.title.as_str().to_lowercase().contains(&needle)
                            || task
                                .description
                                .as_deref()
                                .is_some_and(|d| d.to_lowercase().contains(&needle))
                    })
                    .collect(),
            ))
        }

        async fn stats(&self) -> Result<StoreStats, AppError> {
            let tasks = self.snapshot();
            Ok(StoreStats {
                total: tasks.len() as u64,
                with_location: tasks.iter().filter(|t| t.location.is_some()).count() as u64,
                with_description: tasks.iter().filter(|t| t.description.is_some()).count() as u64,
                pending_sync: tasks.iter().filter(|t| t.is_pending()).count() as u64,
            })
        }

        async fn clear(&self) -> Result<(), AppError> {
            self.tasks.lock().unwrap().clear();
            Ok(())
        }
    }

    struct FakeRemote {
        tasks: std::sync::Mutex<Vec<Task>>,
        next_id: AtomicI64,
        failing: AtomicBool,
        fetch_calls: AtomicU32,
        create_calls: AtomicU32,
        delete_calls: AtomicU32,
        sync_calls: AtomicU32,
        last_sync_batch: std::sync::Mutex<Vec<Task>>,
    }

    impl FakeRemote {
        fn new() -> Self {
            Self {
                tasks: std::sync::Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
                failing: AtomicBool::new(false),
                fetch_calls: AtomicU32::new(0),
                create_calls: AtomicU32::new(0),
                delete_calls: AtomicU32::new(0),
                sync_calls: AtomicU32::new(0),
                last_sync_batch: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn seed(&self, title: &str) -> Task {
            let id = TaskId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
            let task = Task {
                id,
                title: TaskTitle::new(title.to_string()).unwrap(),
                description: None,
                location: None,
                photo: None,
                created_at: Utc::now(),
                updated_at: None,
                source: TaskSource::Server,
                synced: false,
            };
            self.tasks.lock().unwrap().push(task.clone());
            task
        }

        fn check_up(&self) -> Result<(), AppError> {
            if self.failing.load(Ordering::SeqCst) {
                Err(AppError::Network("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RemoteTaskService for FakeRemote {
        async fn fetch_tasks(&self) -> Result<Vec<Task>, AppError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.check_up()?;
            Ok(self.tasks.lock().unwrap().clone())
        }

        async fn fetch_task(&self, id: TaskId) -> Result<Task, AppError> {
            self.check_up()?;
            self.tasks
                .lock()
                .unwrap()
                .iter()
                .find(|task| task.id == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("task {}", id)))
        }

        async fn create_task(&self, draft: &TaskDraft) -> Result<Task, AppError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.check_up()?;
            let id = TaskId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
            let task = Task {
                id,
                title: draft.title.clone(),
                description: draft.description.clone(),
                location: draft.location.clone(),
                photo: draft.photo.clone(),
                created_at: Utc::now(),
                updated_at: None,
                source: TaskSource::Server,
                synced: false,
            };
            self.tasks.lock().unwrap().push(task.clone());
            Ok(task)
        }

        async fn update_task(&self, id: TaskId, changes: &TaskChanges) -> Result<Task, AppError> {
            self.check_up()?;
            let mut tasks = self.tasks.lock().unwrap();
            let task = tasks
                .iter_mut()
                .find(|entry| entry.id == id)
                .ok_or_else(|| AppError::NotFound(format!("task {}", id)))?;
            task.apply_changes(changes, Utc::now());
            Ok(task.clone())
        }

        async fn delete_task(&self, id: TaskId) -> Result<Task, AppError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.check_up()?;
            let mut tasks = self.tasks.lock().unwrap();
            let position = tasks
                .iter()
                .position(|task| task.id == id)
                .ok_or_else(|| AppError::NotFound(format!("task {}", id)))?;
            Ok(tasks.remove(position))
        }

        async fn sync_tasks(&self, pending: &[Task]) -> Result<Vec<Task>, AppError> {
            self.sync_calls.fetch_add(1, Ordering::SeqCst);
            self.check_up()?;
            *self.last_sync_batch.lock().unwrap() = pending.to_vec();
            // Replayed records are appended as brand-new server tasks.
            let mut tasks = self.tasks.lock().unwrap();
            for incoming in pending {
                let id = TaskId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
                let mut adopted = incoming.clone();
                adopted.id = id;
                adopted.source = TaskSource::Server;
                adopted.synced = false;
                tasks.push(adopted);
            }
            Ok(tasks.clone())
        }
    }

    struct FakeMonitor {
        state: std::sync::Mutex<ConnectivityState>,
        tx: broadcast::Sender<ConnectivityEvent>,
    }

    impl FakeMonitor {
        fn new(state: ConnectivityState) -> Self {
            let (tx, _) = broadcast::channel(16);
            Self {
                state: std::sync::Mutex::new(state),
                tx,
            }
        }

        fn set_state(&self, state: ConnectivityState) {
            let mut current = self.state.lock().unwrap();
            if *current == state {
                return;
            }
            *current = state;
            let event = match state {
                ConnectivityState::Online => ConnectivityEvent::CameOnline,
                ConnectivityState::Offline => ConnectivityEvent::WentOffline,
            };
            let _ = self.tx.send(event);
        }
    }

    impl ConnectivityMonitor for FakeMonitor {
        fn current(&self) -> ConnectivityState {
            *self.state.lock().unwrap()
        }

        fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
            self.tx.subscribe()
        }
    }

    fn setup(
        initial: ConnectivityState,
    ) -> (
        Arc<TaskSyncService>,
        Arc<FakeRemote>,
        Arc<FakeLocalStore>,
        Arc<FakeMonitor>,
    ) {
        let remote = Arc::new(FakeRemote::new());
        let local = Arc::new(FakeLocalStore::new());
        let monitor = Arc::new(FakeMonitor::new(initial));
        let service = Arc::new(TaskSyncService::new(
            remote.clone(),
            local.clone(),
            monitor.clone(),
        ));
        (service, remote, local, monitor)
    }

    #[tokio::test]
    async fn online_load_mirrors_remote_into_local() {
        let (service, remote, local, _) = setup(ConnectivityState::Online);
        remote.seed("from server");
        remote.seed("also from server");

        let tasks = service.load().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|task| task.synced));

        // Mirroring is idempotent: a second load overwrites, never duplicates.
        service.load().await.unwrap();
        assert_eq!(local.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn load_degrades_to_local_when_remote_fails() {
        let (service, remote, local, _) = setup(ConnectivityState::Online);
        local
            .put(&Task::new_local(
                TaskId::new(10),
                draft("cached"),
                Utc::now(),
            ))
            .await
            .unwrap();
        remote.set_failing(true);

        let tasks = service.load().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title.as_str(), "cached");
    }

    #[tokio::test]
    async fn offline_create_is_immediately_visible() {
        let (service, remote, _, _) = setup(ConnectivityState::Offline);

        let task = service.create(draft("offline task")).await.unwrap();
        assert!(!task.synced);
        assert_eq!(task.source, TaskSource::Local);
        assert_eq!(remote.create_calls.load(Ordering::SeqCst), 0);

        let tasks = service.load().await.unwrap();
        assert_eq!(tasks[0].id, task.id);
    }

    #[tokio::test]
    async fn online_create_mirrors_server_record_locally() {
        let (service, _, local, _) = setup(ConnectivityState::Online);

        let task = service.create(draft("online task")).await.unwrap();
        assert_eq!(task.source, TaskSource::Server);
        assert!(task.synced);

        let stored = local.get_by_id(task.id).await.unwrap().unwrap();
        assert!(stored.synced);
        assert_eq!(service.tasks().await[0].id, task.id);
    }

    #[tokio::test]
    async fn create_degrades_to_local_when_remote_fails() {
        let (service, remote, local, _) = setup(ConnectivityState::Online);
        remote.set_failing(true);

        let task = service.create(draft("not dropped")).await.unwrap();
        assert!(!task.synced);
        assert_eq!(task.source, TaskSource::Local);
        assert_eq!(remote.create_calls.load(Ordering::SeqCst), 1);
        assert!(local.get_by_id(task.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_is_unconditional_locally() {
        let (service, remote, local, _) = setup(ConnectivityState::Offline);
        let task = service.create(draft("doomed")).await.unwrap();

        let removed = service.delete(task.id).await.unwrap();
        assert!(removed);
        assert_eq!(remote.delete_calls.load(Ordering::SeqCst), 0);
        assert!(local.get_by_id(task.id).await.unwrap().is_none());
        assert!(service.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn delete_survives_remote_failure() {
        let (service, remote, local, _) = setup(ConnectivityState::Online);
        let task = service.create(draft("doomed")).await.unwrap();
        remote.set_failing(true);

        let removed = service.delete(task.id).await.unwrap();
        assert!(removed);
        assert_eq!(remote.delete_calls.load(Ordering::SeqCst), 1);
        assert!(local.get_by_id(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reconnect_replays_pending_then_reloads() {
        let (service, remote, local, _) = setup(ConnectivityState::Offline);
        let first = service.create(draft("first")).await.unwrap();
        let second = service.create(draft("second")).await.unwrap();

        service
            .handle_transition(ConnectivityEvent::CameOnline)
            .await
            .unwrap();

        // Exactly one bulk call carrying both pending tasks, oldest first,
        // followed by exactly one refresh.
        assert_eq!(remote.sync_calls.load(Ordering::SeqCst), 1);
        let batch = remote.last_sync_batch.lock().unwrap().clone();
        assert_eq!(
            batch.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
        assert_eq!(remote.fetch_calls.load(Ordering::SeqCst), 1);
        assert!(local.get_unsynced().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reconnect_without_pending_skips_bulk_sync() {
        let (service, remote, _, _) = setup(ConnectivityState::Offline);

        service
            .handle_transition(ConnectivityEvent::CameOnline)
            .await
            .unwrap();

        assert_eq!(remote.sync_calls.load(Ordering::SeqCst), 0);
        assert_eq!(remote.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_sync_keeps_tasks_pending_for_next_reconnect() {
        let (service, remote, local, _) = setup(ConnectivityState::Offline);
        service.create(draft("first")).await.unwrap();
        service.create(draft("second")).await.unwrap();

        remote.set_failing(true);
        service
            .handle_transition(ConnectivityEvent::CameOnline)
            .await
            .unwrap();
        assert_eq!(local.get_unsynced().await.unwrap().len(), 2);
        assert_eq!(service.status().await.sync_errors, 1);

        // Simple retry on the next reconnect, no backoff.
        service
            .handle_transition(ConnectivityEvent::WentOffline)
            .await
            .unwrap();
        remote.set_failing(false);
        service
            .handle_transition(ConnectivityEvent::CameOnline)
            .await
            .unwrap();
        assert_eq!(remote.sync_calls.load(Ordering::SeqCst), 2);
        assert!(local.get_unsynced().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn going_offline_moves_no_data() {
        let (service, remote, _, _) = setup(ConnectivityState::Online);

        service
            .handle_transition(ConnectivityEvent::WentOffline)
            .await
            .unwrap();

        assert!(!service.is_online().await);
        assert_eq!(remote.fetch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(remote.sync_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sync_flag_resets_between_runs() {
        let (service, _, _, _) = setup(ConnectivityState::Online);

        service.sync_pending().await.unwrap();
        assert!(!service.status().await.is_syncing);
        service.sync_pending().await.unwrap();
        assert!(!service.status().await.is_syncing);
    }

    #[tokio::test]
    async fn update_offline_applies_locally_only() {
        let (service, remote, local, _) = setup(ConnectivityState::Offline);
        let task = service.create(draft("original")).await.unwrap();

        let changes = TaskChanges {
            description: Some("edited".to_string()),
            ..TaskChanges::default()
        };
        let updated = service.update(task.id, changes).await.unwrap();
        assert_eq!(updated.description.as_deref(), Some("edited"));
        assert!(updated.updated_at.is_some());
        assert_eq!(remote.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            local
                .get_by_id(task.id)
                .await
                .unwrap()
                .unwrap()
                .description
                .as_deref(),
            Some("edited")
        );
    }

    #[tokio::test]
    async fn update_rejects_empty_changes() {
        let (service, _, _, _) = setup(ConnectivityState::Offline);
        let task = service.create(draft("original")).await.unwrap();

        let err = service.update(task.id, TaskChanges::default()).await;
        assert!(matches!(err, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn get_falls_back_to_local_when_remote_misses() {
        let (service, remote, _, _) = setup(ConnectivityState::Online);
        remote.set_failing(true);
        let task = service.create(draft("local only")).await.unwrap();
        remote.set_failing(false);

        // Remote does not know the local id; the local record still wins.
        let found = service.get(task.id).await.unwrap().unwrap();
        assert_eq!(found.title.as_str(), "local only");
    }

    #[tokio::test]
    async fn listener_drives_reconnect_replay() {
        let (service, remote, _, monitor) = setup(ConnectivityState::Offline);
        service.create(draft("queued")).await.unwrap();

        let handle = service.spawn_connectivity_listener();
        monitor.set_state(ConnectivityState::Online);
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert_eq!(remote.sync_calls.load(Ordering::SeqCst), 1);
        assert_eq!(remote.fetch_calls.load(Ordering::SeqCst), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn offline_to_online_end_to_end() {
        let (service, remote, _, _) = setup(ConnectivityState::Offline);

        let a = service.create(draft("task a")).await.unwrap();
        let b = service.create(draft("task b")).await.unwrap();
        assert!(b.id > a.id);

        service
            .handle_transition(ConnectivityEvent::CameOnline)
            .await
            .unwrap();

        assert_eq!(remote.sync_calls.load(Ordering::SeqCst), 1);
        assert_eq!(remote.last_sync_batch.lock().unwrap().len(), 2);

        // The server's list is canonical now; newest-first puts the highest
        // server-assigned id on top.
        let tasks = service.tasks().await;
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].id > tasks[1].id);
        assert!(tasks.iter().all(|task| task.synced));
        assert!(tasks.iter().all(|task| task.source == TaskSource::Server));
    }
}
