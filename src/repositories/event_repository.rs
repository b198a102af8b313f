use super::{RepositoryError, RepositoryResult};
use crate::models::{Event, EventWithCreator, NewEvent};
use crate::policy::ListScope;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const EVENT_COLUMNS: &str = "id, title, description, date, location, creator_id, is_approved, \
                             created_at, updated_at";

const EVENT_WITH_CREATOR_SELECT: &str = r#"
    SELECT
        e.id, e.title, e.description, e.date, e.location, e.creator_id,
        e.is_approved, e.created_at, e.updated_at,
        u.username AS creator_name,
        u.email AS creator_email
    FROM events e
    JOIN users u ON u.id = e.creator_id
"#;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait EventRepository: Send + Sync {
    /// Inserts a pending event owned by `creator_id`.
    async fn create(&self, creator_id: i64, event: NewEvent) -> RepositoryResult<Event>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Event>>;
    async fn find_with_creator(&self, id: i64) -> RepositoryResult<Option<EventWithCreator>>;
    /// Newest `date` first.
    async fn list(&self, scope: ListScope) -> RepositoryResult<Vec<EventWithCreator>>;
    async fn set_approved(&self, id: i64, is_approved: bool) -> RepositoryResult<Event>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn create(&self, creator_id: i64, event: NewEvent) -> RepositoryResult<Event> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO events
                (title, description, date, location, creator_id, is_approved, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, FALSE, ?, ?)
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.location)
        .bind(creator_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn find_with_creator(&self, id: i64) -> RepositoryResult<Option<EventWithCreator>> {
        let sql = format!("{EVENT_WITH_CREATOR_SELECT} WHERE e.id = ?");
        let record = sqlx::query_as::<_, EventWithCreator>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn list(&self, scope: ListScope) -> RepositoryResult<Vec<EventWithCreator>> {
        let filter = match scope {
            ListScope::All => "",
            ListScope::ApprovedOnly => "WHERE e.is_approved = TRUE",
        };
        let sql = format!("{EVENT_WITH_CREATOR_SELECT} {filter} ORDER BY e.date DESC, e.id DESC");

        let records = sqlx::query_as::<_, EventWithCreator>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn set_approved(&self, id: i64, is_approved: bool) -> RepositoryResult<Event> {
        let result = sqlx::query("UPDATE events SET is_approved = ?, updated_at = ? WHERE id = ?")
            .bind(is_approved)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
