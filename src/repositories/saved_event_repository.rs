use super::{map_unique_violation, RepositoryResult};
use crate::models::SavedEventRecord;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashSet;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SavedEventRepository: Send + Sync {
    async fn exists(&self, user_id: i64, event_id: i64) -> RepositoryResult<bool>;
    /// Fails with `AlreadyExists` when the (user, event) pair is already saved.
    async fn insert(&self, user_id: i64, event_id: i64) -> RepositoryResult<()>;
    /// Returns whether a row was removed; removing a missing row is not an error.
    async fn remove(&self, user_id: i64, event_id: i64) -> RepositoryResult<bool>;
    async fn saved_event_ids(&self, user_id: i64) -> RepositoryResult<HashSet<i64>>;
    /// Newest save first.
    async fn list_for_user(&self, user_id: i64) -> RepositoryResult<Vec<SavedEventRecord>>;
}

pub struct SqliteSavedEventRepository {
    pool: SqlitePool,
}

impl SqliteSavedEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SavedEventRepository for SqliteSavedEventRepository {
    async fn exists(&self, user_id: i64, event_id: i64) -> RepositoryResult<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM saved_events WHERE user_id = ? AND event_id = ?")
                .bind(user_id)
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, user_id: i64, event_id: i64) -> RepositoryResult<()> {
        sqlx::query("INSERT INTO saved_events (user_id, event_id, saved_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(event_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(())
    }

    async fn remove(&self, user_id: i64, event_id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM saved_events WHERE user_id = ? AND event_id = ?")
            .bind(user_id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn saved_event_ids(&self, user_id: i64) -> RepositoryResult<HashSet<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT event_id FROM saved_events WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn list_for_user(&self, user_id: i64) -> RepositoryResult<Vec<SavedEventRecord>> {
        let records = sqlx::query_as::<_, SavedEventRecord>(
            r#"
            SELECT
                s.id AS saved_id,
                s.saved_at,
                e.id, e.title, e.description, e.date, e.location, e.creator_id,
                e.is_approved, e.created_at, e.updated_at,
                u.username AS creator_name,
                u.email AS creator_email
            FROM saved_events s
            JOIN events e ON e.id = s.event_id
            JOIN users u ON u.id = e.creator_id
            WHERE s.user_id = ?
            ORDER BY s.saved_at DESC, s.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}
