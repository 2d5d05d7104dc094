use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    entities::{
        media::{Media, MediaResponse},
        option_fields::OptionField,
        technology::{NewTechnology, Technology},
    },
    errors::AppError,
};

// ───── Constants ──────────────────────────────────────────────────────
const MAX_NAME_LENGTH: u64 = 500;
const MAX_SHORT_DESCRIPTION_LENGTH: u64 = 255;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub short_description: String,
    pub repository_link: Option<String>,
    pub project_link: Option<String>,
    pub is_published: bool,
    pub featured: bool,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project with its owned media and tech stack, fully materialized.
///
/// This is the aggregate root for association changes: both sides of a
/// project/media link are updated through it together.
#[derive(Debug, Clone)]
pub struct ProjectDetails {
    pub project: Project,
    pub media: Vec<Media>,
    pub tech_stack: Vec<Technology>,
}

impl ProjectDetails {
    pub fn has_media(&self, media_id: &Uuid) -> bool {
        self.media.iter().any(|m| m.id == *media_id)
    }

    pub fn has_technology(&self, technology_id: &Uuid) -> bool {
        self.tech_stack.iter().any(|t| t.id == *technology_id)
    }

    /// Takes ownership of `media`: sets its owner and adds it to the collection.
    pub fn attach_media(&mut self, mut media: Media) -> Result<(), AppError> {
        if self.has_media(&media.id) {
            return Err(AppError::DuplicateAssociation(format!(
                "Media {} is already associated with project {}",
                media.id, self.project.id
            )));
        }
        if let Some(owner) = media.project_id.filter(|owner| *owner != self.project.id) {
            return Err(AppError::DuplicateAssociation(format!(
                "Media {} is already associated with project {}",
                media.id, owner
            )));
        }

        media.project_id = Some(self.project.id);
        self.media.push(media);
        self.project.updated_at = Utc::now();
        Ok(())
    }

    /// Releases `media_id` from the collection and clears its owner.
    pub fn detach_media(&mut self, media_id: &Uuid) -> Result<Media, AppError> {
        let index = self
            .media
            .iter()
            .position(|m| m.id == *media_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Media {} not found in project {}",
                    media_id, self.project.id
                ))
            })?;

        let mut media = self.media.remove(index);
        media.project_id = None;
        self.project.updated_at = Utc::now();
        Ok(media)
    }

    /// Adds a technology; returns `false` when it was already in the stack.
    pub fn attach_technology(&mut self, technology: Technology) -> bool {
        if self.has_technology(&technology.id) {
            return false;
        }
        self.tech_stack.push(technology);
        self.project.updated_at = Utc::now();
        true
    }
}

#[derive(Debug, Clone)]
pub struct ProjectInsert {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub short_description: String,
    pub repository_link: Option<String>,
    pub project_link: Option<String>,
    pub is_published: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectInsert {
    pub fn into_project(self) -> Project {
        Project {
            id: self.id,
            name: self.name,
            description: self.description,
            short_description: self.short_description,
            repository_link: self.repository_link,
            project_link: self.project_link,
            is_published: self.is_published,
            featured: self.featured,
            views: 0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyResponse {
    pub id: Uuid,
    pub name: String,
    pub icon_url: String,
}

impl From<Technology> for TechnologyResponse {
    fn from(technology: Technology) -> Self {
        TechnologyResponse {
            id: technology.id,
            name: technology.name,
            icon_url: technology.icon_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub short_description: String,
    pub repository_link: Option<String>,
    pub project_link: Option<String>,
    pub is_published: bool,
    pub featured: bool,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub media: Vec<MediaResponse>,
    pub tech_stack: Vec<TechnologyResponse>,
}

impl From<ProjectDetails> for ProjectResponse {
    fn from(details: ProjectDetails) -> Self {
        let ProjectDetails { project, media, tech_stack } = details;
        ProjectResponse {
            id: project.id,
            name: project.name,
            description: project.description,
            short_description: project.short_description,
            repository_link: project.repository_link,
            project_link: project.project_link,
            is_published: project.is_published,
            featured: project.featured,
            views: project.views,
            created_at: project.created_at,
            updated_at: project.updated_at,
            media: media.into_iter().map(MediaResponse::from).collect(),
            tech_stack: tech_stack.into_iter().map(TechnologyResponse::from).collect(),
        }
    }
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProjectRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Name must be 1-500 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,

    #[validate(length(min = 1, max = MAX_SHORT_DESCRIPTION_LENGTH, message = "Short description must be 1-255 characters"))]
    pub short_description: String,

    #[validate(url(message = "Repository link must be a valid URL"))]
    pub repository_link: Option<String>,

    #[validate(url(message = "Project link must be a valid URL"))]
    pub project_link: Option<String>,

    #[serde(default)]
    pub is_published: bool,

    #[serde(default)]
    pub featured: bool,

    /// Ids of previously uploaded media.
    #[serde(default)]
    pub media: Vec<Uuid>,

    #[serde(default)]
    #[validate(nested)]
    pub tech_stack: Vec<NewTechnology>,
}

impl NewProjectRequest {
    pub fn prepare_for_insert(&self) -> ProjectInsert {
        let now = Utc::now();
        ProjectInsert {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            description: self.description.clone(),
            short_description: self.short_description.clone(),
            repository_link: self.repository_link.clone(),
            project_link: self.project_link.clone(),
            is_published: self.is_published,
            featured: self.featured,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Name must be 1-500 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = MAX_SHORT_DESCRIPTION_LENGTH, message = "Short description must be 1-255 characters"))]
    pub short_description: Option<String>,

    #[validate(custom(function = "validate_optional_link"))]
    pub repository_link: OptionField<String>,

    #[validate(custom(function = "validate_optional_link"))]
    pub project_link: OptionField<String>,

    pub is_published: Option<bool>,

    pub featured: Option<bool>,
}

impl UpdateProjectRequest {
    pub fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(short_description) = self.short_description {
            project.short_description = short_description;
        }
        self.repository_link.apply_to(&mut project.repository_link);
        self.project_link.apply_to(&mut project.project_link);
        if let Some(is_published) = self.is_published {
            project.is_published = is_published;
        }
        if let Some(featured) = self.featured {
            project.featured = featured;
        }
        project.updated_at = Utc::now();
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMediaRequest {
    pub media_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub published: Option<bool>,
}

// ───── Validation Helpers ───────────────────────────────────────────

fn validate_optional_link(value: &OptionField<String>) -> Result<(), ValidationError> {
    match value.value_ref() {
        Some(link) => validate_link(link),
        None => Ok(()),
    }
}

fn validate_link(link: &str) -> Result<(), ValidationError> {
    match url::Url::parse(link) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        Ok(_) => Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://")),
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

fn new_validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::media::{MediaInsert, MediaKind};

    fn details() -> ProjectDetails {
        let request = NewProjectRequest {
            name: "Portfolio".into(),
            description: "Long".into(),
            short_description: "Short".into(),
            repository_link: None,
            project_link: None,
            is_published: true,
            featured: false,
            media: vec![],
            tech_stack: vec![],
        };
        ProjectDetails {
            project: request.prepare_for_insert().into_project(),
            media: vec![],
            tech_stack: vec![],
        }
    }

    fn media() -> Media {
        MediaInsert {
            id: Uuid::new_v4(),
            kind: MediaKind::Photo,
            url: "https://bucket.s3.amazonaws.com/images/a.png".into(),
            alt: None,
            original_name: "a.png".into(),
            file_name: "1-abcdefgh.png".into(),
            mime_type: "image/png".into(),
            size: 10,
            uploaded_at: Utc::now(),
            uploaded_by: None,
        }
        .into_media()
    }

    #[test]
    fn attach_media_updates_both_sides() {
        let mut project = details();
        let item = media();
        let id = item.id;

        project.attach_media(item).unwrap();

        assert!(project.has_media(&id));
        assert_eq!(project.media[0].project_id, Some(project.project.id));
    }

    #[test]
    fn attaching_twice_is_a_duplicate() {
        let mut project = details();
        let item = media();

        project.attach_media(item.clone()).unwrap();
        let err = project.attach_media(item).unwrap_err();

        assert!(matches!(err, AppError::DuplicateAssociation(_)));
        assert_eq!(project.media.len(), 1);
    }

    #[test]
    fn media_owned_elsewhere_is_rejected() {
        let mut project = details();
        let mut item = media();
        item.project_id = Some(Uuid::new_v4());

        assert!(matches!(project.attach_media(item), Err(AppError::DuplicateAssociation(_))));
    }

    #[test]
    fn detach_media_clears_owner() {
        let mut project = details();
        let item = media();
        let id = item.id;
        project.attach_media(item).unwrap();

        let released = project.detach_media(&id).unwrap();

        assert_eq!(released.project_id, None);
        assert!(project.media.is_empty());
        assert!(matches!(project.detach_media(&id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn attach_technology_is_idempotent() {
        let mut project = details();
        let rust = Technology { id: Uuid::new_v4(), name: "Rust".into(), icon_url: "rust.svg".into() };

        assert!(project.attach_technology(rust.clone()));
        assert!(!project.attach_technology(rust));
        assert_eq!(project.tech_stack.len(), 1);
    }

    #[test]
    fn new_project_request_rejects_bad_links() {
        let request: NewProjectRequest = serde_json::from_value(serde_json::json!({
            "name": "Site",
            "description": "Long",
            "shortDescription": "Short",
            "repositoryLink": "not a url"
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn update_request_clears_links_with_null() {
        let mut project = details().project;
        project.repository_link = Some("https://github.com/me/site".into());

        let patch: UpdateProjectRequest = serde_json::from_value(serde_json::json!({
            "repositoryLink": null,
            "featured": true
        }))
        .unwrap();
        patch.validate().unwrap();
        patch.apply(&mut project);

        assert_eq!(project.repository_link, None);
        assert!(project.featured);
        assert_eq!(project.name, "Portfolio");
    }

    #[test]
    fn update_request_validates_link_fields() {
        let bad: UpdateProjectRequest = serde_json::from_value(serde_json::json!({
            "projectLink": "ftp://example.com/site"
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("project_link"));

        let good: UpdateProjectRequest = serde_json::from_value(serde_json::json!({
            "projectLink": "https://example.com/site",
            "repositoryLink": null
        }))
        .unwrap();
        assert!(good.validate().is_ok());
    }
}
