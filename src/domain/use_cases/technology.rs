use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::technology::{NewTechnology, Technology, TechnologyDetails},
    errors::AppError,
    repositories::technology::TechnologyRepository,
};

pub struct TechnologyHandler {
    pub technology_repo: Arc<dyn TechnologyRepository>,
}

impl TechnologyHandler {
    pub fn new(technology_repo: Arc<dyn TechnologyRepository>) -> Self {
        TechnologyHandler { technology_repo }
    }

    pub async fn list_technologies(&self) -> Result<Vec<Technology>, AppError> {
        self.technology_repo.get_all_technologies().await
    }

    pub async fn get_technology(&self, id: &Uuid) -> Result<TechnologyDetails, AppError> {
        let technology = self.technology_repo.get_technology_by_id(id).await?;
        let project_ids = self.technology_repo.get_technology_project_ids(id).await?;
        Ok(TechnologyDetails::new(technology, project_ids))
    }

    /// Returns the existing technology when the name is already taken.
    /// The boolean is `true` when a new row was created.
    pub async fn create_technology(&self, request: NewTechnology) -> Result<(Technology, bool), AppError> {
        request.validate()?;

        if let Some(existing) = self.technology_repo.find_technology_by_name(&request.name).await? {
            return Ok((existing, false));
        }

        let created = self.technology_repo.create_technology(&request.into_technology()).await?;
        info!(technology_id = %created.id, name = %created.name, "Technology created");
        Ok((created, true))
    }

    pub async fn update_technology(&self, id: &Uuid, request: NewTechnology) -> Result<Technology, AppError> {
        request.validate()?;

        let mut technology = self.technology_repo.get_technology_by_id(id).await?;
        technology.name = request.name;
        technology.icon_url = request.icon_url;

        self.technology_repo.update_technology(&technology).await
    }

    /// Also unlinks it from every project.
    pub async fn delete_technology(&self, id: &Uuid) -> Result<(), AppError> {
        self.technology_repo.delete_technology(id).await?;
        info!(technology_id = %id, "Technology deleted");
        Ok(())
    }
}
