use crate::application::ports::LocalTaskStore;
use crate::domain::entities::{StoreStats, Task, TaskChanges, TaskDraft};
use crate::domain::value_objects::TaskId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

use super::local_id::LocalIdSequence;
use super::rows::TaskRow;

/// SQLite-backed local task store: the durable cache of the server list and
/// the outbox of unsynced local creations.
pub struct SqliteTaskStore {
    pool: Pool<Sqlite>,
    ids: LocalIdSequence,
}

impl SqliteTaskStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            pool,
            ids: LocalIdSequence::new(),
        }
    }

    async fn fetch_row(&self, id: TaskId) -> Result<Option<TaskRow>, AppError> {
        let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = ?1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl LocalTaskStore for SqliteTaskStore {
    async fn put(&self, task: &Task) -> Result<(), AppError> {
        let row = TaskRow::from_task(task);
        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, title, description, latitude, longitude, accuracy,
                location_timestamp, photo_data, photo_name, created_at,
                updated_at, source, is_synced
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                accuracy = excluded.accuracy,
                location_timestamp = excluded.location_timestamp,
                photo_data = excluded.photo_data,
                photo_name = excluded.photo_name,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                source = excluded.source,
                is_synced = excluded.is_synced
            "#,
        )
        .bind(row.id)
        .bind(&row.title)
        .bind(&row.description)
        .bind(row.latitude)
        .bind(row.longitude)
        .bind(row.accuracy)
        .bind(row.location_timestamp)
        .bind(&row.photo_data)
        .bind(&row.photo_name)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(&row.source)
        .bind(row.is_synced)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_local(&self, draft: TaskDraft) -> Result<Task, AppError> {
        // Seed the sequence with the highest id already on disk so a restart
        // within the same millisecond cannot reissue an id.
        let max_row = sqlx::query("SELECT COALESCE(MAX(id), 0) AS max_id FROM tasks")
            .fetch_one(&self.pool)
            .await?;
        let max_id: i64 = max_row.try_get("max_id").unwrap_or(0);

        let id = TaskId::new(self.ids.next_after(max_id));
        let task = Task::new_local(id, draft, Utc::now());
        self.put(&task).await?;
        Ok(task)
    }

    async fn get_all(&self) -> Result<Vec<Task>, AppError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT * FROM tasks ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, AppError> {
        self.fetch_row(id).await?.map(TaskRow::into_task).transpose()
    }

    async fn update(&self, id: TaskId, changes: &TaskChanges) -> Result<Task, AppError> {
        let row = self
            .fetch_row(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task {}", id)))?;

        let mut task = row.into_task()?;
        task.apply_changes(changes, Utc::now());
        self.put(&task).await?;
        Ok(task)
    }

    async fn delete(&self, id: TaskId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_unsynced(&self) -> Result<Vec<Task>, AppError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT * FROM tasks WHERE is_synced = 0 ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    async fn mark_synced(&self, ids: &[TaskId]) -> Result<(), AppError> {
        for id in ids {
            sqlx::query("UPDATE tasks SET is_synced = 1 WHERE id = ?1")
                .bind(id.as_i64())
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Task>, AppError> {
        let pattern = format!("%{}%", query.to_lowercase());
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT * FROM tasks
            WHERE LOWER(title) LIKE ?1
               OR LOWER(COALESCE(description, '')) LIKE ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    async fn stats(&self) -> Result<StoreStats, AppError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                SUM(CASE WHEN latitude IS NOT NULL THEN 1 ELSE 0 END) AS with_location,
                SUM(CASE WHEN description IS NOT NULL THEN 1 ELSE 0 END) AS with_description,
                SUM(CASE WHEN is_synced = 0 THEN 1 ELSE 0 END) AS pending_sync
            FROM tasks
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreStats {
            total: row.try_get::<i64, _>("total").unwrap_or(0) as u64,
            with_location: row.try_get::<i64, _>("with_location").unwrap_or(0) as u64,
            with_description: row.try_get::<i64, _>("with_description").unwrap_or(0) as u64,
            pending_sync: row.try_get::<i64, _>("pending_sync").unwrap_or(0) as u64,
        })
    }

    async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM tasks").execute(&self.pool).await?;
        Ok(())
    }
}
