mod store_stats;
mod sync_report;
mod task;

pub use store_stats::StoreStats;
pub use sync_report::SyncReport;
pub use task::{Task, TaskChanges, TaskDraft, TaskSource};
