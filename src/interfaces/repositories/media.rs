use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    entities::media::{Media, MediaInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxMediaRepo,
};

const MEDIA_COLUMNS: &str = "id, kind, url, alt, original_name, file_name, mime_type, size, \
     uploaded_at, uploaded_by, project_id";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn create_media(&self, media: &MediaInsert) -> Result<Media, AppError>;
    async fn get_media_by_id(&self, id: &Uuid) -> Result<Media, AppError>;
    /// Newest first.
    async fn get_all_media(&self) -> Result<Vec<Media>, AppError>;
    async fn get_media_by_project(&self, project_id: &Uuid) -> Result<Vec<Media>, AppError>;
    async fn update_media_alt(&self, id: &Uuid, alt: Option<String>) -> Result<Media, AppError>;
    async fn delete_media(&self, id: &Uuid) -> Result<(), AppError>;
    async fn check_connection(&self) -> Result<(), AppError>;
}

impl SqlxMediaRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxMediaRepo { pool }
    }
}

#[async_trait]
impl MediaRepository for SqlxMediaRepo {
    async fn create_media(&self, media: &MediaInsert) -> Result<Media, AppError> {
        let sql = format!(
            r#"
            INSERT INTO media (
                id, kind, url, alt, original_name, file_name, mime_type, size,
                uploaded_at, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {MEDIA_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Media>(&sql)
            .bind(media.id)
            .bind(media.kind)
            .bind(&media.url)
            .bind(&media.alt)
            .bind(&media.original_name)
            .bind(&media.file_name)
            .bind(&media.mime_type)
            .bind(media.size)
            .bind(media.uploaded_at)
            .bind(&media.uploaded_by)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn get_media_by_id(&self, id: &Uuid) -> Result<Media, AppError> {
        let sql = format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = $1");

        sqlx::query_as::<_, Media>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media not found with id: {}", id)))
    }

    async fn get_all_media(&self) -> Result<Vec<Media>, AppError> {
        let sql = format!("SELECT {MEDIA_COLUMNS} FROM media ORDER BY uploaded_at DESC");

        let media = sqlx::query_as::<_, Media>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(media)
    }

    async fn get_media_by_project(&self, project_id: &Uuid) -> Result<Vec<Media>, AppError> {
        let sql = format!(
            "SELECT {MEDIA_COLUMNS} FROM media WHERE project_id = $1 ORDER BY uploaded_at ASC"
        );

        let media = sqlx::query_as::<_, Media>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(media)
    }

    async fn update_media_alt(&self, id: &Uuid, alt: Option<String>) -> Result<Media, AppError> {
        let sql = format!("UPDATE media SET alt = $1 WHERE id = $2 RETURNING {MEDIA_COLUMNS}");

        sqlx::query_as::<_, Media>(&sql)
            .bind(alt)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media not found with id: {}", id)))
    }

    async fn delete_media(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Media not found with id: {}", id)));
        }

        Ok(())
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
