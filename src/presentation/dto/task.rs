use crate::domain::entities::Task;
use crate::presentation::dto::Validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Keeps one oversized camera capture from flooding the local store.
const MAX_PHOTO_BYTES: usize = 5_000_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<LocationInput>,
    pub photo: Option<String>,
    pub photo_name: Option<String>,
}

impl Validate for CreateTaskRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Task title is required".to_string());
        }
        if let Some(photo) = &self.photo {
            if photo.len() > MAX_PHOTO_BYTES {
                return Err("Photo is too large (max 5MB)".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<LocationInput>,
    pub photo: Option<String>,
    pub photo_name: Option<String>,
}

impl UpdateTaskRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.photo.is_none()
    }
}

impl Validate for UpdateTaskRequest {
    fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("No fields to update".to_string());
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err("Task title cannot be empty".to_string());
            }
        }
        if let Some(photo) = &self.photo {
            if photo.len() > MAX_PHOTO_BYTES {
                return Err("Photo is too large (max 5MB)".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTasksRequest {
    pub query: String,
}

impl Validate for SearchTasksRequest {
    fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("Search query is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<LocationInput>,
    pub photo: Option<String>,
    pub photo_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub source: String,
    pub synced: bool,
}

impl TaskResponse {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.as_i64(),
            title: task.title.as_str().to_string(),
            description: task.description.clone(),
            location: task.location.as_ref().map(|loc| LocationInput {
                latitude: loc.latitude,
                longitude: loc.longitude,
                accuracy: loc.accuracy,
                timestamp: loc.timestamp,
            }),
            photo: task.photo.as_ref().map(|p| p.data_uri().to_string()),
            photo_name: task
                .photo
                .as_ref()
                .and_then(|p| p.file_name().map(str::to_string)),
            created_at: task.created_at,
            updated_at: task.updated_at,
            source: task.source.to_string(),
            synced: task.synced,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTaskResponse {
    pub id: i64,
    pub removed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
            description: None,
            location: None,
            photo: None,
            photo_name: None,
        }
    }

    #[test]
    fn create_request_requires_a_title() {
        assert!(request("write minutes").validate().is_ok());
        assert!(request("").validate().is_err());
        assert!(request("   ").validate().is_err());
    }

    #[test]
    fn create_request_caps_photo_size() {
        let mut oversized = request("selfie");
        oversized.photo = Some("x".repeat(MAX_PHOTO_BYTES + 1));
        assert!(oversized.validate().is_err());
    }

    #[test]
    fn update_request_rejects_empty_change_set() {
        let empty = UpdateTaskRequest {
            title: None,
            description: None,
            location: None,
            photo: None,
            photo_name: None,
        };
        assert!(empty.validate().is_err());
    }
}
