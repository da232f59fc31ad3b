use crate::domain::value_objects::{GeoPoint, PhotoAttachment, TaskId, TaskTitle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side created the record. Display only, never consulted for
/// conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSource {
    Server,
    Local,
}

impl TaskSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskSource::Server => "server",
            TaskSource::Local => "local",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "server" => Some(TaskSource::Server),
            "local" => Some(TaskSource::Local),
            _ => None,
        }
    }
}

impl fmt::Display for TaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: TaskTitle,
    pub description: Option<String>,
    pub location: Option<GeoPoint>,
    pub photo: Option<PhotoAttachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub source: TaskSource,
    /// Local-store-only flag: true once the record is known to be persisted
    /// on the server. Locally created tasks start out pending.
    #[serde(default)]
    pub synced: bool,
}

impl Task {
    /// Materialize a draft as a locally created record. The caller supplies
    /// the freshly assigned local id.
    pub fn new_local(id: TaskId, draft: TaskDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            photo: draft.photo,
            created_at,
            updated_at: None,
            source: TaskSource::Local,
            synced: false,
        }
    }

    pub fn mark_synced(&mut self) {
        self.synced = true;
    }

    pub fn is_pending(&self) -> bool {
        !self.synced
    }

    pub fn apply_changes(&mut self, changes: &TaskChanges, now: DateTime<Utc>) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = Some(description.clone());
        }
        if let Some(location) = &changes.location {
            self.location = Some(location.clone());
        }
        if let Some(photo) = &changes.photo {
            self.photo = Some(photo.clone());
        }
        self.updated_at = Some(now);
    }
}

/// Validated creation payload. Holding a `TaskTitle` makes an empty title
/// unrepresentable, so no store can be reached with an invalid record.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: TaskTitle,
    pub description: Option<String>,
    pub location: Option<GeoPoint>,
    pub photo: Option<PhotoAttachment>,
}

impl TaskDraft {
    pub fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: None,
            location: None,
            photo: None,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_photo(mut self, photo: PhotoAttachment) -> Self {
        self.photo = Some(photo);
        self
    }
}

/// Partial update payload. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<TaskTitle>,
    pub description: Option<String>,
    pub location: Option<GeoPoint>,
    pub photo: Option<PhotoAttachment>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.photo.is_none()
    }
}
