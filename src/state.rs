use crate::application::ports::connectivity::ConnectivityState;
use crate::application::services::TaskSyncService;
use crate::infrastructure::connectivity::{ChannelConnectivityMonitor, ConnectivityHandle};
use crate::infrastructure::database::{ConnectionPool, SqliteTaskStore};
use crate::infrastructure::remote::HttpTaskService;
use crate::presentation::handlers::TaskHandler;
use crate::shared::AppConfig;
use std::sync::Arc;
use tracing::info;

/// Production wiring: every collaborator is constructed here and injected
/// explicitly, so hosts and tests can rebuild the graph with substitutes.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<TaskHandler>,
    pub sync_service: Arc<TaskSyncService>,
    pub connectivity: ConnectivityHandle,
    pool: ConnectionPool,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate().map_err(anyhow::Error::msg)?;
        std::fs::create_dir_all(&config.storage.data_dir)?;

        let pool =
            ConnectionPool::new(&config.database.url, config.database.max_connections).await?;
        pool.migrate().await?;

        let local = Arc::new(SqliteTaskStore::new(pool.get_pool().clone()));
        let remote = Arc::new(HttpTaskService::new(config.remote.base_url.clone()));

        let initial = if config.sync.start_online {
            ConnectivityState::Online
        } else {
            ConnectivityState::Offline
        };
        let monitor = Arc::new(ChannelConnectivityMonitor::new(initial));
        let connectivity = monitor.handle();

        let sync_service = Arc::new(TaskSyncService::new(remote, local, monitor));
        if config.sync.auto_sync {
            let _listener = sync_service.spawn_connectivity_listener();
        }

        let handler = Arc::new(TaskHandler::new(sync_service.clone()));

        info!(
            "Task sync initialized (db: {}, api: {})",
            config.database.url, config.remote.base_url
        );

        Ok(Self {
            handler,
            sync_service,
            connectivity,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}
