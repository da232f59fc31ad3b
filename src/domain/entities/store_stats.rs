use serde::{Deserialize, Serialize};

/// Aggregate counts over the local store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total: u64,
    pub with_location: u64,
    pub with_description: u64,
    pub pending_sync: u64,
}
