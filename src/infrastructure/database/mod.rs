mod connection_pool;
mod local_id;
mod rows;
mod sqlite_task_store;

pub use connection_pool::ConnectionPool;
pub use local_id::LocalIdSequence;
pub use sqlite_task_store::SqliteTaskStore;
