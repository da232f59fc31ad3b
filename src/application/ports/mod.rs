pub mod connectivity;
pub mod local_store;
pub mod remote_service;

pub use connectivity::{ConnectivityEvent, ConnectivityMonitor, ConnectivityState};
pub use local_store::LocalTaskStore;
pub use remote_service::RemoteTaskService;
