use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::{
    entities::{
        media::{Media, MediaInsert},
        project::{Project, ProjectInsert},
        technology::Technology,
        timeline_event::{TimelineEvent, TimelineEventKind},
    },
    errors::AppError,
    repositories::{
        media::MediaRepository,
        project::{ProjectLinks, ProjectRepository},
        technology::TechnologyRepository,
        timeline::TimelineRepository,
    },
};

#[derive(Debug, Default)]
struct Tables {
    media: HashMap<Uuid, Media>,
    projects: HashMap<Uuid, Project>,
    technologies: HashMap<Uuid, Technology>,
    /// (project_id, technology_id)
    project_technologies: BTreeSet<(Uuid, Uuid)>,
    timeline_events: HashMap<Uuid, TimelineEvent>,
}

impl Tables {
    fn project_mut(&mut self, id: &Uuid) -> Result<&mut Project, AppError> {
        self.projects
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Project not found with id: {}", id)))
    }

    fn name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.technologies
            .values()
            .any(|t| t.name == name && Some(t.id) != except)
    }
}

/// Every repository over a single lock-guarded table set.
///
/// Each method holds the lock for its whole body, which gives the same
/// all-or-nothing behaviour as the Postgres transactions.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    tables: Mutex<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

fn media_not_found(id: &Uuid) -> AppError {
    AppError::NotFound(format!("Media not found with id: {}", id))
}

fn technology_not_found(id: &Uuid) -> AppError {
    AppError::NotFound(format!("Technology not found with id: {}", id))
}

fn event_not_found(id: &Uuid) -> AppError {
    AppError::NotFound(format!("Timeline event not found with id: {}", id))
}

#[async_trait]
impl MediaRepository for InMemoryDatabase {
    async fn create_media(&self, media: &MediaInsert) -> Result<Media, AppError> {
        let mut tables = self.tables.lock();
        if tables.media.contains_key(&media.id) {
            return Err(AppError::Conflict(format!("Media {} already exists", media.id)));
        }
        let created = media.clone().into_media();
        tables.media.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_media_by_id(&self, id: &Uuid) -> Result<Media, AppError> {
        self.tables
            .lock()
            .media
            .get(id)
            .cloned()
            .ok_or_else(|| media_not_found(id))
    }

    async fn get_all_media(&self) -> Result<Vec<Media>, AppError> {
        let mut media: Vec<Media> = self.tables.lock().media.values().cloned().collect();
        media.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(media)
    }

    async fn get_media_by_project(&self, project_id: &Uuid) -> Result<Vec<Media>, AppError> {
        let mut media: Vec<Media> = self
            .tables
            .lock()
            .media
            .values()
            .filter(|m| m.project_id == Some(*project_id))
            .cloned()
            .collect();
        media.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));
        Ok(media)
    }

    async fn update_media_alt(&self, id: &Uuid, alt: Option<String>) -> Result<Media, AppError> {
        let mut tables = self.tables.lock();
        let media = tables.media.get_mut(id).ok_or_else(|| media_not_found(id))?;
        media.alt = alt;
        Ok(media.clone())
    }

    async fn delete_media(&self, id: &Uuid) -> Result<(), AppError> {
        self.tables
            .lock()
            .media
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| media_not_found(id))
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for InMemoryDatabase {
    async fn create_project(&self, project: &ProjectInsert, links: &ProjectLinks) -> Result<Project, AppError> {
        let mut tables = self.tables.lock();

        if let Some(missing) = links.media_ids.iter().find(|id| !tables.media.contains_key(*id)) {
            return Err(media_not_found(missing));
        }
        if let Some(taken) = links.new_technologies.iter().find(|t| tables.name_taken(&t.name, None)) {
            return Err(AppError::Conflict(format!("Technology '{}' already exists", taken.name)));
        }
        if let Some(missing) = links
            .technology_ids
            .iter()
            .find(|id| !tables.technologies.contains_key(*id) && !links.new_technologies.iter().any(|t| t.id == **id))
        {
            return Err(technology_not_found(missing));
        }

        let created = project.clone().into_project();
        tables.projects.insert(created.id, created.clone());

        for media_id in &links.media_ids {
            if let Some(media) = tables.media.get_mut(media_id) {
                media.project_id = Some(created.id);
            }
        }
        for technology in &links.new_technologies {
            tables.technologies.insert(technology.id, technology.clone());
        }
        for technology_id in &links.technology_ids {
            tables.project_technologies.insert((created.id, *technology_id));
        }

        Ok(created)
    }

    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError> {
        let mut tables = self.tables.lock();
        tables.project_mut(id).map(|p| p.clone())
    }

    async fn get_all_projects(&self, published_only: bool) -> Result<Vec<Project>, AppError> {
        let mut projects: Vec<Project> = self
            .tables
            .lock()
            .projects
            .values()
            .filter(|p| !published_only || p.is_published)
            .cloned()
            .collect();
        projects.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(projects)
    }

    async fn update_project(&self, project: &Project) -> Result<Project, AppError> {
        let mut tables = self.tables.lock();
        let stored = tables.project_mut(&project.id)?;
        let views = stored.views;
        *stored = Project { views, ..project.clone() };
        Ok(stored.clone())
    }

    async fn increment_views(&self, id: &Uuid) -> Result<Project, AppError> {
        let mut tables = self.tables.lock();
        let project = tables.project_mut(id)?;
        project.views += 1;
        Ok(project.clone())
    }

    async fn attach_media(&self, project_id: &Uuid, media_id: &Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock();
        tables.project_mut(project_id)?;
        let media = tables.media.get_mut(media_id).ok_or_else(|| media_not_found(media_id))?;
        media.project_id = Some(*project_id);
        tables.project_mut(project_id)?.updated_at = Utc::now();
        Ok(())
    }

    async fn touch_project(&self, id: &Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock();
        if let Some(project) = tables.projects.get_mut(id) {
            project.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn get_project_technologies(&self, project_id: &Uuid) -> Result<Vec<Technology>, AppError> {
        let tables = self.tables.lock();
        let mut technologies: Vec<Technology> = tables
            .project_technologies
            .iter()
            .filter(|(project, _)| project == project_id)
            .filter_map(|(_, technology)| tables.technologies.get(technology).cloned())
            .collect();
        technologies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(technologies)
    }

    async fn attach_technology(&self, project_id: &Uuid, technology_id: &Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock();
        tables.project_mut(project_id)?;
        if !tables.technologies.contains_key(technology_id) {
            return Err(technology_not_found(technology_id));
        }
        if tables.project_technologies.insert((*project_id, *technology_id)) {
            tables.project_mut(project_id)?.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn detach_technology(&self, project_id: &Uuid, technology_id: &Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock();
        if !tables.project_technologies.remove(&(*project_id, *technology_id)) {
            return Err(AppError::NotFound(format!(
                "Technology {} not found in project {}",
                technology_id, project_id
            )));
        }
        tables.project_mut(project_id)?.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock();
        if tables.projects.remove(id).is_none() {
            return Err(AppError::NotFound(format!("Project not found with id: {}", id)));
        }
        tables.project_technologies.retain(|(project, _)| project != id);
        tables.media.retain(|_, media| media.project_id != Some(*id));
        Ok(())
    }
}

#[async_trait]
impl TechnologyRepository for InMemoryDatabase {
    async fn get_all_technologies(&self) -> Result<Vec<Technology>, AppError> {
        let mut technologies: Vec<Technology> =
            self.tables.lock().technologies.values().cloned().collect();
        technologies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(technologies)
    }

    async fn get_technology_by_id(&self, id: &Uuid) -> Result<Technology, AppError> {
        self.tables
            .lock()
            .technologies
            .get(id)
            .cloned()
            .ok_or_else(|| technology_not_found(id))
    }

    async fn find_technology_by_name(&self, name: &str) -> Result<Option<Technology>, AppError> {
        Ok(self
            .tables
            .lock()
            .technologies
            .values()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn create_technology(&self, technology: &Technology) -> Result<Technology, AppError> {
        let mut tables = self.tables.lock();
        if tables.technologies.contains_key(&technology.id) || tables.name_taken(&technology.name, None) {
            return Err(AppError::Conflict(format!(
                "Technology '{}' already exists",
                technology.name
            )));
        }
        tables.technologies.insert(technology.id, technology.clone());
        Ok(technology.clone())
    }

    async fn update_technology(&self, technology: &Technology) -> Result<Technology, AppError> {
        let mut tables = self.tables.lock();
        if !tables.technologies.contains_key(&technology.id) {
            return Err(technology_not_found(&technology.id));
        }
        if tables.name_taken(&technology.name, Some(technology.id)) {
            return Err(AppError::Conflict(format!(
                "Technology '{}' already exists",
                technology.name
            )));
        }
        tables.technologies.insert(technology.id, technology.clone());
        Ok(technology.clone())
    }

    async fn delete_technology(&self, id: &Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock();
        if tables.technologies.remove(id).is_none() {
            return Err(technology_not_found(id));
        }
        tables.project_technologies.retain(|(_, technology)| technology != id);
        Ok(())
    }

    async fn get_technology_project_ids(&self, id: &Uuid) -> Result<Vec<Uuid>, AppError> {
        Ok(self
            .tables
            .lock()
            .project_technologies
            .iter()
            .filter(|(_, technology)| technology == id)
            .map(|(project, _)| *project)
            .collect())
    }
}

#[async_trait]
impl TimelineRepository for InMemoryDatabase {
    async fn get_all_events(&self) -> Result<Vec<TimelineEvent>, AppError> {
        let mut events: Vec<TimelineEvent> =
            self.tables.lock().timeline_events.values().cloned().collect();
        events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(events)
    }

    async fn get_events_by_kind(&self, kind: TimelineEventKind) -> Result<Vec<TimelineEvent>, AppError> {
        let mut events: Vec<TimelineEvent> = self
            .tables
            .lock()
            .timeline_events
            .values()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(events)
    }

    async fn get_event_by_id(&self, id: &Uuid) -> Result<TimelineEvent, AppError> {
        self.tables
            .lock()
            .timeline_events
            .get(id)
            .cloned()
            .ok_or_else(|| event_not_found(id))
    }

    async fn create_event(&self, event: &TimelineEvent) -> Result<TimelineEvent, AppError> {
        self.tables.lock().timeline_events.insert(event.id, event.clone());
        Ok(event.clone())
    }

    async fn update_event(&self, event: &TimelineEvent) -> Result<TimelineEvent, AppError> {
        let mut tables = self.tables.lock();
        let stored = tables
            .timeline_events
            .get_mut(&event.id)
            .ok_or_else(|| event_not_found(&event.id))?;
        *stored = event.clone();
        Ok(event.clone())
    }

    async fn delete_event(&self, id: &Uuid) -> Result<(), AppError> {
        self.tables
            .lock()
            .timeline_events
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| event_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::media::MediaKind;

    fn media_insert() -> MediaInsert {
        MediaInsert {
            id: Uuid::new_v4(),
            kind: MediaKind::Photo,
            url: "https://portfolio.s3.amazonaws.com/images/1-abcdefgh.png".into(),
            alt: None,
            original_name: "logo.png".into(),
            file_name: "1-abcdefgh.png".into(),
            mime_type: "image/png".into(),
            size: 4,
            uploaded_at: Utc::now(),
            uploaded_by: None,
        }
    }

    fn project_insert(name: &str) -> ProjectInsert {
        let now = Utc::now();
        ProjectInsert {
            id: Uuid::new_v4(),
            name: name.into(),
            description: "Long".into(),
            short_description: "Short".into(),
            repository_link: None,
            project_link: None,
            is_published: true,
            featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_project_rejects_unknown_media_and_persists_nothing() {
        let db = InMemoryDatabase::new();
        let links = ProjectLinks {
            media_ids: vec![Uuid::new_v4()],
            ..Default::default()
        };

        let err = db.create_project(&project_insert("Site"), &links).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(db.get_all_projects(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_project_keeps_shared_technology() {
        let db = InMemoryDatabase::new();
        let rust = Technology { id: Uuid::new_v4(), name: "Rust".into(), icon_url: "rust.svg".into() };
        db.create_technology(&rust).await.unwrap();

        let links = ProjectLinks { technology_ids: vec![rust.id], ..Default::default() };
        let first = db.create_project(&project_insert("One"), &links).await.unwrap();
        let second = db.create_project(&project_insert("Two"), &links).await.unwrap();

        db.delete_project(&first.id).await.unwrap();

        assert_eq!(db.get_technology_by_id(&rust.id).await.unwrap(), rust);
        assert_eq!(db.get_technology_project_ids(&rust.id).await.unwrap(), vec![second.id]);
    }

    #[tokio::test]
    async fn delete_project_removes_owned_media_rows() {
        let db = InMemoryDatabase::new();
        let media = db.create_media(&media_insert()).await.unwrap();
        let links = ProjectLinks { media_ids: vec![media.id], ..Default::default() };
        let project = db.create_project(&project_insert("Site"), &links).await.unwrap();

        assert_eq!(db.get_media_by_project(&project.id).await.unwrap().len(), 1);

        db.delete_project(&project.id).await.unwrap();

        assert!(matches!(db.get_media_by_id(&media.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_project_keeps_view_count() {
        let db = InMemoryDatabase::new();
        let project = db.create_project(&project_insert("Site"), &ProjectLinks::default()).await.unwrap();
        db.increment_views(&project.id).await.unwrap();

        let mut changed = project.clone();
        changed.name = "Renamed".into();
        let updated = db.update_project(&changed).await.unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.views, 1);
    }
}
