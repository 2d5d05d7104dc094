use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    entities::timeline_event::{TimelineEvent, TimelineEventKind},
    errors::AppError,
    repositories::sqlx_repo::SqlxTimelineRepo,
};

const EVENT_COLUMNS: &str = "id, occurred_at, title, description, kind, location, image, created_at";

#[async_trait]
pub trait TimelineRepository: Send + Sync {
    /// Most recent first.
    async fn get_all_events(&self) -> Result<Vec<TimelineEvent>, AppError>;
    async fn get_events_by_kind(&self, kind: TimelineEventKind) -> Result<Vec<TimelineEvent>, AppError>;
    async fn get_event_by_id(&self, id: &Uuid) -> Result<TimelineEvent, AppError>;
    async fn create_event(&self, event: &TimelineEvent) -> Result<TimelineEvent, AppError>;
    async fn update_event(&self, event: &TimelineEvent) -> Result<TimelineEvent, AppError>;
    async fn delete_event(&self, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxTimelineRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxTimelineRepo { pool }
    }
}

#[async_trait]
impl TimelineRepository for SqlxTimelineRepo {
    async fn get_all_events(&self) -> Result<Vec<TimelineEvent>, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM timeline_events ORDER BY occurred_at DESC");

        let events = sqlx::query_as::<_, TimelineEvent>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn get_events_by_kind(&self, kind: TimelineEventKind) -> Result<Vec<TimelineEvent>, AppError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM timeline_events WHERE kind = $1 ORDER BY occurred_at DESC"
        );

        let events = sqlx::query_as::<_, TimelineEvent>(&sql)
            .bind(kind)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn get_event_by_id(&self, id: &Uuid) -> Result<TimelineEvent, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM timeline_events WHERE id = $1");

        sqlx::query_as::<_, TimelineEvent>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Timeline event not found with id: {}", id)))
    }

    async fn create_event(&self, event: &TimelineEvent) -> Result<TimelineEvent, AppError> {
        let sql = format!(
            r#"
            INSERT INTO timeline_events (id, occurred_at, title, description, kind, location, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, TimelineEvent>(&sql)
            .bind(event.id)
            .bind(event.occurred_at)
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.kind)
            .bind(&event.location)
            .bind(&event.image)
            .bind(event.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn update_event(&self, event: &TimelineEvent) -> Result<TimelineEvent, AppError> {
        let sql = format!(
            r#"
            UPDATE timeline_events SET
                occurred_at = $1,
                title = $2,
                description = $3,
                kind = $4,
                location = $5,
                image = $6
            WHERE id = $7
            RETURNING {EVENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, TimelineEvent>(&sql)
            .bind(event.occurred_at)
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.kind)
            .bind(&event.location)
            .bind(&event.image)
            .bind(event.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Timeline event not found with id: {}", event.id)))
    }

    async fn delete_event(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM timeline_events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Timeline event not found with id: {}", id)));
        }

        Ok(())
    }
}
