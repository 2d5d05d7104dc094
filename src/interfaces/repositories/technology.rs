use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    entities::technology::Technology,
    errors::AppError,
    repositories::sqlx_repo::SqlxTechnologyRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TechnologyRepository: Send + Sync {
    async fn get_all_technologies(&self) -> Result<Vec<Technology>, AppError>;
    async fn get_technology_by_id(&self, id: &Uuid) -> Result<Technology, AppError>;
    /// Exact, case-sensitive match.
    async fn find_technology_by_name(&self, name: &str) -> Result<Option<Technology>, AppError>;
    async fn create_technology(&self, technology: &Technology) -> Result<Technology, AppError>;
    async fn update_technology(&self, technology: &Technology) -> Result<Technology, AppError>;
    async fn delete_technology(&self, id: &Uuid) -> Result<(), AppError>;
    /// Projects whose tech stack includes the technology.
    async fn get_technology_project_ids(&self, id: &Uuid) -> Result<Vec<Uuid>, AppError>;
}

impl SqlxTechnologyRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxTechnologyRepo { pool }
    }
}

fn map_unique_name(err: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some("technologies_name_key") {
            return AppError::Conflict(format!("Technology '{}' already exists", name));
        }
    }
    AppError::from(err)
}

#[async_trait]
impl TechnologyRepository for SqlxTechnologyRepo {
    async fn get_all_technologies(&self) -> Result<Vec<Technology>, AppError> {
        let technologies = sqlx::query_as::<_, Technology>(
            "SELECT id, name, icon_url FROM technologies ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(technologies)
    }

    async fn get_technology_by_id(&self, id: &Uuid) -> Result<Technology, AppError> {
        sqlx::query_as::<_, Technology>("SELECT id, name, icon_url FROM technologies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Technology not found with id: {}", id)))
    }

    async fn find_technology_by_name(&self, name: &str) -> Result<Option<Technology>, AppError> {
        let technology = sqlx::query_as::<_, Technology>(
            "SELECT id, name, icon_url FROM technologies WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(technology)
    }

    async fn create_technology(&self, technology: &Technology) -> Result<Technology, AppError> {
        sqlx::query_as::<_, Technology>(
            r#"
            INSERT INTO technologies (id, name, icon_url)
            VALUES ($1, $2, $3)
            RETURNING id, name, icon_url
            "#,
        )
        .bind(technology.id)
        .bind(&technology.name)
        .bind(&technology.icon_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_name(e, &technology.name))
    }

    async fn update_technology(&self, technology: &Technology) -> Result<Technology, AppError> {
        sqlx::query_as::<_, Technology>(
            r#"
            UPDATE technologies SET name = $1, icon_url = $2
            WHERE id = $3
            RETURNING id, name, icon_url
            "#,
        )
        .bind(&technology.name)
        .bind(&technology.icon_url)
        .bind(technology.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_name(e, &technology.name))?
        .ok_or_else(|| AppError::NotFound(format!("Technology not found with id: {}", technology.id)))
    }

    async fn delete_technology(&self, id: &Uuid) -> Result<(), AppError> {
        // project_technologies rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM technologies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Technology not found with id: {}", id)));
        }

        Ok(())
    }

    async fn get_technology_project_ids(&self, id: &Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT project_id FROM project_technologies WHERE technology_id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
