use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::timeline_event::TimelineEventRequest,
    errors::AppError,
    use_cases::extractors::AdminClaims,
    utils::valid_uuid::valid_uuid,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_events(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let events = state.timeline_handler.list_events().await?;
    Ok(HttpResponse::Ok().json(events))
}

#[instrument(skip(state))]
pub async fn list_events_by_type(
    kind: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let events = state.timeline_handler.list_events_by_kind(&kind).await?;
    Ok(HttpResponse::Ok().json(events))
}

#[instrument(skip(state))]
pub async fn get_event(
    event_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&event_id)?;

    let event = state.timeline_handler.get_event(&id).await?;
    Ok(HttpResponse::Ok().json(event))
}

#[instrument(skip(_claims, state, data))]
pub async fn create_event(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    data: web::Json<TimelineEventRequest>,
) -> Result<impl Responder, AppError> {
    let event = state.timeline_handler.create_event(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(event))
}

#[instrument(skip(_claims, state, data))]
pub async fn update_event(
    _claims: AdminClaims,
    event_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<TimelineEventRequest>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&event_id)?;

    let event = state.timeline_handler.update_event(&id, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(event))
}

#[instrument(skip(_claims, state))]
pub async fn delete_event(
    _claims: AdminClaims,
    event_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&event_id)?;

    state.timeline_handler.delete_event(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
