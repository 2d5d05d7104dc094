use std::{collections::HashSet, sync::Arc};

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        project::{NewProjectRequest, Project, ProjectDetails, UpdateProjectRequest},
        technology::{NewTechnology, Technology, TechnologyRequest},
    },
    errors::AppError,
    repositories::{
        media::MediaRepository,
        project::{ProjectLinks, ProjectRepository},
        technology::TechnologyRepository,
    },
    use_cases::media::MediaHandler,
};

/// Keeps a project's media and technology collections consistent.
///
/// Media belong to exactly one project and are deleted with it; technologies
/// are shared and only unlinked.
pub struct ProjectHandler {
    pub project_repo: Arc<dyn ProjectRepository>,
    pub media_repo: Arc<dyn MediaRepository>,
    pub technology_repo: Arc<dyn TechnologyRepository>,
    pub media_handler: Arc<MediaHandler>,
}

impl ProjectHandler {
    pub fn new(
        project_repo: Arc<dyn ProjectRepository>,
        media_repo: Arc<dyn MediaRepository>,
        technology_repo: Arc<dyn TechnologyRepository>,
        media_handler: Arc<MediaHandler>,
    ) -> Self {
        ProjectHandler {
            project_repo,
            media_repo,
            technology_repo,
            media_handler,
        }
    }

    /// Creates a project that takes ownership of previously uploaded media
    /// and links a tech stack, creating technologies that do not exist yet.
    pub async fn create_project(&self, request: NewProjectRequest) -> Result<ProjectDetails, AppError> {
        request.validate()?;

        let mut media_ids = Vec::with_capacity(request.media.len());
        for media_id in &request.media {
            if media_ids.contains(media_id) {
                continue;
            }
            let media = self.media_repo.get_media_by_id(media_id).await?;
            if let Some(owner) = media.project_id {
                return Err(AppError::DuplicateAssociation(format!(
                    "Media {} is already associated with project {}",
                    media.id, owner
                )));
            }
            media_ids.push(*media_id);
        }

        let links = self.resolve_tech_stack(&request.tech_stack, media_ids).await?;
        let insert = request.prepare_for_insert();
        let project = self.project_repo.create_project(&insert, &links).await?;

        info!(
            project_id = %project.id,
            media = links.media_ids.len(),
            technologies = links.technology_ids.len(),
            "Project created"
        );

        self.load_details(project).await
    }

    async fn resolve_tech_stack(&self, stack: &[NewTechnology], media_ids: Vec<Uuid>) -> Result<ProjectLinks, AppError> {
        let mut links = ProjectLinks {
            media_ids,
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for entry in stack {
            if !seen.insert(entry.name.as_str()) {
                continue;
            }
            match self.technology_repo.find_technology_by_name(&entry.name).await? {
                Some(existing) => links.technology_ids.push(existing.id),
                None => {
                    let technology = entry.clone().into_technology();
                    links.technology_ids.push(technology.id);
                    links.new_technologies.push(technology);
                }
            }
        }

        Ok(links)
    }

    pub async fn list_projects(&self, published_only: bool) -> Result<Vec<ProjectDetails>, AppError> {
        let projects = self.project_repo.get_all_projects(published_only).await?;

        let mut details = Vec::with_capacity(projects.len());
        for project in projects {
            details.push(self.load_details(project).await?);
        }
        Ok(details)
    }

    pub async fn get_project(&self, id: &Uuid) -> Result<ProjectDetails, AppError> {
        let project = self.project_repo.get_project_by_id(id).await?;
        self.load_details(project).await
    }

    /// Public detail read; counts as a view.
    pub async fn view_project(&self, id: &Uuid) -> Result<ProjectDetails, AppError> {
        let project = self.project_repo.increment_views(id).await?;
        self.load_details(project).await
    }

    pub async fn update_project(&self, id: &Uuid, patch: UpdateProjectRequest) -> Result<ProjectDetails, AppError> {
        patch.validate()?;

        let mut project = self.project_repo.get_project_by_id(id).await?;
        patch.apply(&mut project);
        let project = self.project_repo.update_project(&project).await?;

        self.load_details(project).await
    }

    /// Makes the project the media's owner.
    pub async fn attach_media(&self, project_id: &Uuid, media_id: &Uuid) -> Result<ProjectDetails, AppError> {
        let mut details = self.get_project(project_id).await?;
        let media = self.media_repo.get_media_by_id(media_id).await?;

        details.attach_media(media)?;
        self.project_repo.attach_media(project_id, media_id).await?;

        info!(project_id = %project_id, media_id = %media_id, "Media attached to project");
        self.get_project(project_id).await
    }

    /// Deletes the media (object and row); it cannot outlive its project link.
    pub async fn detach_media(&self, project_id: &Uuid, media_id: &Uuid) -> Result<ProjectDetails, AppError> {
        let mut details = self.get_project(project_id).await?;
        details.detach_media(media_id)?;

        self.media_handler.delete_media(media_id).await?;
        self.project_repo.touch_project(project_id).await?;

        info!(project_id = %project_id, media_id = %media_id, "Media removed from project");
        self.get_project(project_id).await
    }

    /// Links a technology, reusing it when the id or name resolves and
    /// creating it otherwise. Linking an already linked technology changes
    /// nothing.
    pub async fn attach_technology(&self, project_id: &Uuid, request: TechnologyRequest) -> Result<ProjectDetails, AppError> {
        request.validate()?;
        let mut details = self.get_project(project_id).await?;

        let technology = self.resolve_technology(request).await?;
        if !details.attach_technology(technology.clone()) {
            return Ok(details);
        }

        self.project_repo.attach_technology(project_id, &technology.id).await?;
        info!(project_id = %project_id, technology = %technology.name, "Technology attached to project");

        self.get_project(project_id).await
    }

    async fn resolve_technology(&self, request: TechnologyRequest) -> Result<Technology, AppError> {
        if let Some(id) = request.id {
            match self.technology_repo.get_technology_by_id(&id).await {
                Ok(existing) => return Ok(existing),
                Err(AppError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        if let Some(existing) = self.technology_repo.find_technology_by_name(&request.name).await? {
            return Ok(existing);
        }

        self.technology_repo.create_technology(&request.into_technology()).await
    }

    /// Unlinks the technology; the technology itself survives.
    pub async fn detach_technology(&self, project_id: &Uuid, technology_id: &Uuid) -> Result<ProjectDetails, AppError> {
        let details = self.get_project(project_id).await?;
        if !details.has_technology(technology_id) {
            return Err(AppError::NotFound(format!(
                "Technology {} not found in project {}",
                technology_id, project_id
            )));
        }

        self.project_repo.detach_technology(project_id, technology_id).await?;
        info!(project_id = %project_id, technology_id = %technology_id, "Technology removed from project");

        self.get_project(project_id).await
    }

    /// Deletes owned media (objects, then rows) and then the project with
    /// its technology links.
    pub async fn delete_project(&self, id: &Uuid) -> Result<(), AppError> {
        let details = self.get_project(id).await?;

        for media in &details.media {
            match self.media_handler.delete_media(&media.id).await {
                Ok(()) => {}
                Err(AppError::NotFound(_)) => {
                    warn!(media_id = %media.id, "Media vanished during project deletion");
                }
                Err(e) => return Err(e),
            }
        }

        self.project_repo.delete_project(id).await?;
        info!(project_id = %id, media = details.media.len(), "Project deleted");
        Ok(())
    }

    async fn load_details(&self, project: Project) -> Result<ProjectDetails, AppError> {
        let media = self.media_repo.get_media_by_project(&project.id).await?;
        let tech_stack = self.project_repo.get_project_technologies(&project.id).await?;

        Ok(ProjectDetails {
            project,
            media,
            tech_stack,
        })
    }
}
