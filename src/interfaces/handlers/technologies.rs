use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::technology::NewTechnology,
    errors::AppError,
    use_cases::extractors::AdminClaims,
    utils::valid_uuid::valid_uuid,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_technologies(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let technologies = state.technology_handler.list_technologies().await?;
    Ok(HttpResponse::Ok().json(technologies))
}

#[instrument(skip(state))]
pub async fn get_technology(
    technology_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&technology_id)?;

    let technology = state.technology_handler.get_technology(&id).await?;
    Ok(HttpResponse::Ok().json(technology))
}

#[instrument(skip(_claims, state, data))]
pub async fn create_technology(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    data: web::Json<NewTechnology>,
) -> Result<impl Responder, AppError> {
    let (technology, created) = state.technology_handler.create_technology(data.into_inner()).await?;

    if created {
        Ok(HttpResponse::Created().json(technology))
    } else {
        Ok(HttpResponse::Ok().json(technology))
    }
}

#[instrument(skip(_claims, state, data))]
pub async fn update_technology(
    _claims: AdminClaims,
    technology_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<NewTechnology>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&technology_id)?;

    let technology = state.technology_handler.update_technology(&id, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(technology))
}

#[instrument(skip(_claims, state))]
pub async fn delete_technology(
    _claims: AdminClaims,
    technology_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&technology_id)?;

    state.technology_handler.delete_technology(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
