use crate::domain::entities::{Task, TaskChanges, TaskDraft, TaskSource};
use crate::domain::value_objects::{GeoPoint, PhotoAttachment, TaskId, TaskTitle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::RemoteServiceError;

/// Wire shape of a task record: camelCase fields, the photo attachment
/// spread over `photo`/`photoName`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub synced: bool,
}

impl TaskPayload {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.as_i64(),
            title: task.title.as_str().to_string(),
            description: task.description.clone(),
            location: task.location.clone(),
            photo: task.photo.as_ref().map(|p| p.data_uri().to_string()),
            photo_name: task
                .photo
                .as_ref()
                .and_then(|p| p.file_name().map(str::to_string)),
            created_at: task.created_at,
            updated_at: task.updated_at,
            source: Some(task.source.as_str().to_string()),
            synced: task.synced,
        }
    }

    pub fn into_task(self) -> Result<Task, RemoteServiceError> {
        let title =
            TaskTitle::new(self.title).map_err(RemoteServiceError::InvalidPayload)?;
        let photo = match self.photo {
            Some(data_uri) => Some(
                PhotoAttachment::new(data_uri, self.photo_name)
                    .map_err(RemoteServiceError::InvalidPayload)?,
            ),
            None => None,
        };
        // Anything the server hands back was created there unless it says
        // otherwise.
        let source = self
            .source
            .as_deref()
            .and_then(TaskSource::parse)
            .unwrap_or(TaskSource::Server);

        Ok(Task {
            id: TaskId::new(self.id),
            title,
            description: self.description,
            location: self.location,
            photo,
            created_at: self.created_at,
            updated_at: self.updated_at,
            source,
            synced: self.synced,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_name: Option<String>,
}

impl CreateTaskBody {
    pub fn from_draft(draft: &TaskDraft) -> Self {
        Self {
            title: draft.title.as_str().to_string(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            photo: draft.photo.as_ref().map(|p| p.data_uri().to_string()),
            photo_name: draft
                .photo
                .as_ref()
                .and_then(|p| p.file_name().map(str::to_string)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_name: Option<String>,
}

impl UpdateTaskBody {
    pub fn from_changes(changes: &TaskChanges) -> Self {
        Self {
            title: changes.title.as_ref().map(|t| t.as_str().to_string()),
            description: changes.description.clone(),
            location: changes.location.clone(),
            photo: changes.photo.as_ref().map(|p| p.data_uri().to_string()),
            photo_name: changes
                .photo
                .as_ref()
                .and_then(|p| p.file_name().map(str::to_string)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SyncRequestBody {
    pub tasks: Vec<TaskPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_defaults_missing_source_to_server() {
        let payload: TaskPayload = serde_json::from_str(
            r#"{"id": 3, "title": "from seed", "createdAt": "2025-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        let task = payload.into_task().unwrap();
        assert_eq!(task.source, TaskSource::Server);
        assert!(!task.synced);
    }

    #[test]
    fn payload_with_blank_title_is_rejected() {
        let payload: TaskPayload = serde_json::from_str(
            r#"{"id": 3, "title": "  ", "createdAt": "2025-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(matches!(
            payload.into_task(),
            Err(RemoteServiceError::InvalidPayload(_))
        ));
    }

    #[test]
    fn create_body_uses_camel_case_photo_fields() {
        let draft = TaskDraft::new(TaskTitle::new("snap".to_string()).unwrap()).with_photo(
            PhotoAttachment::new(
                "data:image/gif;base64,R0lGODlhAQABAAAAACw=".to_string(),
                Some("snap.gif".to_string()),
            )
            .unwrap(),
        );
        let json = serde_json::to_value(CreateTaskBody::from_draft(&draft)).unwrap();
        assert_eq!(json["photoName"], "snap.gif");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn update_body_skips_untouched_fields() {
        let changes = TaskChanges {
            description: Some("new text".to_string()),
            ..TaskChanges::default()
        };
        let json = serde_json::to_value(UpdateTaskBody::from_changes(&changes)).unwrap();
        assert_eq!(json["description"], "new text");
        assert!(json.get("title").is_none());
    }
}
