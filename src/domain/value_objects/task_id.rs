use serde::{Deserialize, Serialize};
use std::fmt;

/// Task identifier. Assigned once by whichever store creates the record
/// first (server sequence value, or local monotonic clock value) and never
/// reassigned afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(i64);

impl TaskId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TaskId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<TaskId> for i64 {
    fn from(value: TaskId) -> Self {
        value.0
    }
}
