use crate::domain::entities::{Task, TaskSource};
use crate::domain::value_objects::{GeoPoint, PhotoAttachment, TaskId, TaskTitle};
use crate::shared::error::AppError;
use chrono::DateTime;
use sqlx::FromRow;

/// Storage shape of a task. Timestamps are unix milliseconds; the location
/// and photo value objects are spread over nullable columns.
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub location_timestamp: Option<i64>,
    pub photo_data: Option<String>,
    pub photo_name: Option<String>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub source: String,
    pub is_synced: bool,
}

impl TaskRow {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.as_i64(),
            title: task.title.as_str().to_string(),
            description: task.description.clone(),
            latitude: task.location.as_ref().map(|loc| loc.latitude),
            longitude: task.location.as_ref().map(|loc| loc.longitude),
            accuracy: task.location.as_ref().and_then(|loc| loc.accuracy),
            location_timestamp: task.location.as_ref().and_then(|loc| loc.timestamp),
            photo_data: task.photo.as_ref().map(|photo| photo.data_uri().to_string()),
            photo_name: task
                .photo
                .as_ref()
                .and_then(|photo| photo.file_name().map(str::to_string)),
            created_at: task.created_at.timestamp_millis(),
            updated_at: task.updated_at.map(|ts| ts.timestamp_millis()),
            source: task.source.as_str().to_string(),
            is_synced: task.synced,
        }
    }

    pub fn into_task(self) -> Result<Task, AppError> {
        let title = TaskTitle::new(self.title)
            .map_err(|err| corrupt_row(self.id, &err))?;

        let location = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                let mut point = GeoPoint::new(latitude, longitude)
                    .map_err(|err| corrupt_row(self.id, &err))?;
                point.accuracy = self.accuracy;
                point.timestamp = self.location_timestamp;
                Some(point)
            }
            _ => None,
        };

        let photo = match self.photo_data {
            Some(data_uri) => Some(
                PhotoAttachment::new(data_uri, self.photo_name)
                    .map_err(|err| corrupt_row(self.id, &err))?,
            ),
            None => None,
        };

        let created_at = DateTime::from_timestamp_millis(self.created_at)
            .ok_or_else(|| corrupt_row(self.id, "invalid creation timestamp"))?;
        let updated_at = match self.updated_at {
            Some(millis) => Some(
                DateTime::from_timestamp_millis(millis)
                    .ok_or_else(|| corrupt_row(self.id, "invalid update timestamp"))?,
            ),
            None => None,
        };

        let source = TaskSource::parse(&self.source)
            .ok_or_else(|| corrupt_row(self.id, &format!("unknown source '{}'", self.source)))?;

        Ok(Task {
            id: TaskId::new(self.id),
            title,
            description: self.description,
            location,
            photo,
            created_at,
            updated_at,
            source,
            synced: self.is_synced,
        })
    }
}

fn corrupt_row(id: i64, reason: &str) -> AppError {
    AppError::Database(format!("Corrupt task row {}: {}", id, reason))
}
