use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        project::{AddMediaRequest, NewProjectRequest, ProjectListQuery, ProjectResponse, UpdateProjectRequest},
        technology::TechnologyRequest,
    },
    errors::AppError,
    use_cases::extractors::AdminClaims,
    utils::valid_uuid::valid_uuid,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<ProjectListQuery>,
) -> Result<impl Responder, AppError> {
    let published_only = query.published.unwrap_or(false);
    let projects = state.project_handler.list_projects(published_only).await?;

    let response: Vec<ProjectResponse> = projects.into_iter().map(ProjectResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state))]
pub async fn get_project(
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&project_id)?;

    let project = state.project_handler.view_project(&id).await?;
    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

#[instrument(skip(_claims, state, data))]
pub async fn create_project(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    data: web::Json<NewProjectRequest>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.create_project(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(ProjectResponse::from(project)))
}

#[instrument(skip(_claims, state, data))]
pub async fn update_project(
    _claims: AdminClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateProjectRequest>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&project_id)?;

    let project = state.project_handler.update_project(&id, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

#[instrument(skip(_claims, state))]
pub async fn delete_project(
    _claims: AdminClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&project_id)?;

    state.project_handler.delete_project(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(_claims, state, data))]
pub async fn add_media(
    _claims: AdminClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<AddMediaRequest>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&project_id)?;

    let project = state.project_handler.attach_media(&id, &data.media_id).await?;
    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

#[instrument(skip(_claims, state))]
pub async fn remove_media(
    _claims: AdminClaims,
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let (project_id, media_id) = path.into_inner();
    let project_id = valid_uuid(&project_id)?;
    let media_id = valid_uuid(&media_id)?;

    let project = state.project_handler.detach_media(&project_id, &media_id).await?;
    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

#[instrument(skip(_claims, state, data))]
pub async fn add_technology(
    _claims: AdminClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<TechnologyRequest>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&project_id)?;

    let project = state.project_handler.attach_technology(&id, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

#[instrument(skip(_claims, state))]
pub async fn remove_technology(
    _claims: AdminClaims,
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let (project_id, technology_id) = path.into_inner();
    let project_id = valid_uuid(&project_id)?;
    let technology_id = valid_uuid(&technology_id)?;

    let project = state.project_handler.detach_technology(&project_id, &technology_id).await?;
    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}
