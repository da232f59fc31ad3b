use serde::{Deserialize, Serialize};

/// Outcome of one replay of the pending outbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub synced_count: u32,
    pub failed_count: u32,
    pub pending_count: u32,
}

impl SyncReport {
    pub fn empty() -> Self {
        Self::default()
    }
}
