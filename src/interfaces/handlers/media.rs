use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use bytes::Bytes;
use tracing::instrument;
use validator::Validate;

use crate::{
    constants::DEFAULT_SIGNED_URL_TTL_SECS,
    entities::media::{MediaResponse, MediaUploadForm, SignedUrlQuery, SignedUrlResponse, UpdateMediaRequest, UploadMedia},
    errors::AppError,
    use_cases::extractors::AdminClaims,
    utils::valid_uuid::valid_uuid,
    AppState,
};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[instrument(skip(state))]
pub async fn list_media(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let media = state.media_handler.list_media().await?;

    let response: Vec<MediaResponse> = media.into_iter().map(MediaResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state))]
pub async fn get_media_stats(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let stats = state.media_handler.media_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[instrument(skip(state))]
pub async fn get_media(
    media_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&media_id)?;

    let media = state.media_handler.get_media(&id).await?;
    Ok(HttpResponse::Ok().json(MediaResponse::from(media)))
}

#[instrument(skip(state))]
pub async fn get_signed_url(
    media_id: web::Path<String>,
    query: web::Query<SignedUrlQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&media_id)?;
    let expires_in = query.expires_in.unwrap_or(DEFAULT_SIGNED_URL_TTL_SECS);

    let signed_url = state
        .media_handler
        .generate_signed_url(&id, Some(expires_in))
        .await?;

    Ok(HttpResponse::Ok().json(SignedUrlResponse { signed_url, expires_in }))
}

#[instrument(skip(claims, state, form))]
pub async fn upload_media(
    claims: AdminClaims,
    state: web::Data<AppState>,
    form: MultipartForm<MediaUploadForm>,
) -> Result<impl Responder, AppError> {
    let form = form.into_inner();
    let original_name = form
        .file
        .file_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("Uploaded file must have a name".into()))?;

    let content_type = form
        .file
        .content_type
        .as_ref()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    let body = tokio::fs::read(form.file.file.path())
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to read uploaded file: {}", e)))?;

    let upload = UploadMedia {
        byte_length: form.file.size as u64,
        body: Bytes::from(body),
        original_name,
        content_type,
        uploaded_by: form
            .uploaded_by
            .map(|text| text.into_inner())
            .or_else(|| Some(claims.0.sub.clone())),
        alt: form.alt.map(|text| text.into_inner()),
        folder: form.folder.map(|text| text.into_inner()),
    };

    let media = state.media_handler.upload_media(upload).await?;
    Ok(HttpResponse::Created().json(MediaResponse::from(media)))
}

#[instrument(skip(_claims, state, data))]
pub async fn update_media(
    _claims: AdminClaims,
    media_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateMediaRequest>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&media_id)?;
    let request = data.into_inner();
    request.validate()?;

    let media = state.media_handler.update_media_alt(&id, request.alt).await?;
    Ok(HttpResponse::Ok().json(MediaResponse::from(media)))
}

#[instrument(skip(_claims, state))]
pub async fn delete_media(
    _claims: AdminClaims,
    media_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&media_id)?;

    state.media_handler.delete_media(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
