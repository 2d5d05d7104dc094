use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::{
        project::{Project, ProjectInsert},
        technology::Technology,
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str = "id, name, description, short_description, repository_link, \
     project_link, is_published, featured, views, created_at, updated_at";

/// Associations written together with a new project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectLinks {
    /// Existing media to take ownership of.
    pub media_ids: Vec<Uuid>,
    /// Technologies that do not exist yet and are inserted first.
    pub new_technologies: Vec<Technology>,
    /// Every technology in the stack, new ones included.
    pub technology_ids: Vec<Uuid>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Writes the project row, media ownership and tech stack in one transaction.
    async fn create_project(&self, project: &ProjectInsert, links: &ProjectLinks) -> Result<Project, AppError>;
    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError>;
    async fn get_all_projects(&self, published_only: bool) -> Result<Vec<Project>, AppError>;
    async fn update_project(&self, project: &Project) -> Result<Project, AppError>;
    async fn increment_views(&self, id: &Uuid) -> Result<Project, AppError>;
    /// Sets the media owner and refreshes the project's `updated_at`.
    async fn attach_media(&self, project_id: &Uuid, media_id: &Uuid) -> Result<(), AppError>;
    async fn touch_project(&self, id: &Uuid) -> Result<(), AppError>;
    async fn get_project_technologies(&self, project_id: &Uuid) -> Result<Vec<Technology>, AppError>;
    /// No-op when the link already exists.
    async fn attach_technology(&self, project_id: &Uuid, technology_id: &Uuid) -> Result<(), AppError>;
    async fn detach_technology(&self, project_id: &Uuid, technology_id: &Uuid) -> Result<(), AppError>;
    /// Removes the project, its remaining media rows and its join rows.
    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn create_project(&self, project: &ProjectInsert, links: &ProjectLinks) -> Result<Project, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO projects (
                id, name, description, short_description, repository_link, project_link,
                is_published, featured, views, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, $10)
            RETURNING {PROJECT_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Project>(&sql)
            .bind(project.id)
            .bind(&project.name)
            .bind(&project.description)
            .bind(&project.short_description)
            .bind(&project.repository_link)
            .bind(&project.project_link)
            .bind(project.is_published)
            .bind(project.featured)
            .bind(project.created_at)
            .bind(project.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        if !links.media_ids.is_empty() {
            sqlx::query("UPDATE media SET project_id = $1 WHERE id = ANY($2)")
                .bind(created.id)
                .bind(&links.media_ids)
                .execute(&mut *tx)
                .await?;
        }

        for technology in &links.new_technologies {
            sqlx::query("INSERT INTO technologies (id, name, icon_url) VALUES ($1, $2, $3)")
                .bind(technology.id)
                .bind(&technology.name)
                .bind(&technology.icon_url)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(db_err) = &e {
                        if db_err.constraint() == Some("technologies_name_key") {
                            return AppError::Conflict(format!(
                                "Technology '{}' already exists",
                                technology.name
                            ));
                        }
                    }
                    AppError::from(e)
                })?;
        }

        if !links.technology_ids.is_empty() {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO project_technologies (project_id, technology_id) ");
            builder.push_values(&links.technology_ids, |mut row, technology_id| {
                row.push_bind(created.id).push_bind(*technology_id);
            });
            builder.push(" ON CONFLICT DO NOTHING");
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");

        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project not found with id: {}", id)))
    }

    async fn get_all_projects(&self, published_only: bool) -> Result<Vec<Project>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PROJECT_COLUMNS} FROM projects"));

        if published_only {
            builder.push(" WHERE is_published = TRUE");
        }
        builder.push(" ORDER BY featured DESC, created_at DESC");

        let projects = builder
            .build_query_as::<Project>()
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    async fn update_project(&self, project: &Project) -> Result<Project, AppError> {
        let sql = format!(
            r#"
            UPDATE projects SET
                name = $1,
                description = $2,
                short_description = $3,
                repository_link = $4,
                project_link = $5,
                is_published = $6,
                featured = $7,
                updated_at = $8
            WHERE id = $9
            RETURNING {PROJECT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Project>(&sql)
            .bind(&project.name)
            .bind(&project.description)
            .bind(&project.short_description)
            .bind(&project.repository_link)
            .bind(&project.project_link)
            .bind(project.is_published)
            .bind(project.featured)
            .bind(project.updated_at)
            .bind(project.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project not found with id: {}", project.id)))
    }

    async fn increment_views(&self, id: &Uuid) -> Result<Project, AppError> {
        let sql = format!(
            "UPDATE projects SET views = views + 1 WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        );

        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project not found with id: {}", id)))
    }

    async fn attach_media(&self, project_id: &Uuid, media_id: &Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE media SET project_id = $1 WHERE id = $2")
            .bind(project_id)
            .bind(media_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Media not found with id: {}", media_id)));
        }

        sqlx::query("UPDATE projects SET updated_at = NOW() WHERE id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn touch_project(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE projects SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_project_technologies(&self, project_id: &Uuid) -> Result<Vec<Technology>, AppError> {
        let technologies = sqlx::query_as::<_, Technology>(
            r#"
            SELECT t.id, t.name, t.icon_url
            FROM technologies t
            JOIN project_technologies pt ON pt.technology_id = t.id
            WHERE pt.project_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(technologies)
    }

    async fn attach_technology(&self, project_id: &Uuid, technology_id: &Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO project_technologies (project_id, technology_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(technology_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            sqlx::query("UPDATE projects SET updated_at = NOW() WHERE id = $1")
                .bind(project_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn detach_technology(&self, project_id: &Uuid, technology_id: &Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "DELETE FROM project_technologies WHERE project_id = $1 AND technology_id = $2",
        )
        .bind(project_id)
        .bind(technology_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Technology {} not found in project {}",
                technology_id, project_id
            )));
        }

        sqlx::query("UPDATE projects SET updated_at = NOW() WHERE id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM project_technologies WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM media WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Project not found with id: {}", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}
