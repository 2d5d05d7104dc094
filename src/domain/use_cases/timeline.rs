use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::timeline_event::{TimelineEvent, TimelineEventKind, TimelineEventRequest},
    errors::AppError,
    repositories::timeline::TimelineRepository,
};

pub struct TimelineHandler {
    pub timeline_repo: Arc<dyn TimelineRepository>,
}

impl TimelineHandler {
    pub fn new(timeline_repo: Arc<dyn TimelineRepository>) -> Self {
        TimelineHandler { timeline_repo }
    }

    /// Most recent first.
    pub async fn list_events(&self) -> Result<Vec<TimelineEvent>, AppError> {
        self.timeline_repo.get_all_events().await
    }

    /// `kind` is matched case-insensitively.
    pub async fn list_events_by_kind(&self, kind: &str) -> Result<Vec<TimelineEvent>, AppError> {
        let kind: TimelineEventKind = kind.parse().map_err(AppError::InvalidInput)?;
        self.timeline_repo.get_events_by_kind(kind).await
    }

    pub async fn get_event(&self, id: &Uuid) -> Result<TimelineEvent, AppError> {
        self.timeline_repo.get_event_by_id(id).await
    }

    pub async fn create_event(&self, request: TimelineEventRequest) -> Result<TimelineEvent, AppError> {
        request.validate()?;

        let event = self.timeline_repo.create_event(&request.prepare_for_insert()).await?;
        info!(event_id = %event.id, kind = %event.kind, "Timeline event created");
        Ok(event)
    }

    pub async fn update_event(&self, id: &Uuid, request: TimelineEventRequest) -> Result<TimelineEvent, AppError> {
        request.validate()?;

        let mut event = self.timeline_repo.get_event_by_id(id).await?;
        request.apply(&mut event);

        self.timeline_repo.update_event(&event).await
    }

    pub async fn delete_event(&self, id: &Uuid) -> Result<(), AppError> {
        self.timeline_repo.delete_event(id).await?;
        info!(event_id = %id, "Timeline event deleted");
        Ok(())
    }
}
