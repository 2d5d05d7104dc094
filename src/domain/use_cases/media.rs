use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    constants::{allowed_mime_types, DEFAULT_SIGNED_URL_TTL_SECS, MAX_SIGNED_URL_TTL_SECS, MAX_UPLOAD_BYTES},
    domain::object_key::{build_key, classify_kind, derive_folder, extract_key_from_url, generate_storage_name, signing_location},
    entities::media::{Media, MediaInsert, MediaStats, UploadMedia},
    errors::AppError,
    repositories::{media::MediaRepository, media_store::MediaStorage},
};

/// Upload, lookup, signing and removal of media assets.
///
/// Every operation touching both stores writes the object first and the row
/// second; nothing is rolled back across the two.
pub struct MediaHandler {
    pub media_repo: Arc<dyn MediaRepository>,
    pub storage: Arc<dyn MediaStorage>,
    bucket: String,
}

impl MediaHandler {
    pub fn new(media_repo: Arc<dyn MediaRepository>, storage: Arc<dyn MediaStorage>, bucket: impl Into<String>) -> Self {
        MediaHandler {
            media_repo,
            storage,
            bucket: bucket.into(),
        }
    }

    /// Validates, stores and records a new file.
    pub async fn upload_media(&self, upload: UploadMedia) -> Result<Media, AppError> {
        let content_type = normalize_content_type(&upload.content_type);
        validate_upload(upload.byte_length, &content_type)?;
        let folder = explicit_folder(upload.folder.as_deref())?
            .unwrap_or_else(|| derive_folder(&content_type));

        let file_name = generate_storage_name(&upload.original_name);
        let key = build_key(folder, &file_name);

        let stored = self
            .storage
            .put(&key, &content_type, upload.body, upload.byte_length)
            .await?;

        let insert = MediaInsert {
            id: Uuid::new_v4(),
            kind: classify_kind(&content_type),
            url: stored.url,
            alt: upload.alt,
            original_name: upload.original_name,
            file_name,
            mime_type: content_type,
            size: upload.byte_length as i64,
            uploaded_at: Utc::now(),
            uploaded_by: upload.uploaded_by,
        };

        let media = self.media_repo.create_media(&insert).await.map_err(|e| {
            error!(key = %stored.key, "Media row insert failed after upload; object left in bucket: {}", e);
            e
        })?;

        info!(media_id = %media.id, key = %stored.key, kind = ?media.kind, "Media uploaded");
        Ok(media)
    }

    pub async fn get_media(&self, id: &Uuid) -> Result<Media, AppError> {
        self.media_repo.get_media_by_id(id).await
    }

    pub async fn list_media(&self) -> Result<Vec<Media>, AppError> {
        self.media_repo.get_all_media().await
    }

    /// Removes the stored object, then the row.
    pub async fn delete_media(&self, id: &Uuid) -> Result<(), AppError> {
        let media = self.media_repo.get_media_by_id(id).await?;
        let key = extract_key_from_url(&media.url, &self.bucket)?;

        self.storage.delete(&key).await?;
        self.media_repo.delete_media(id).await?;

        info!(media_id = %id, key = %key, "Media deleted");
        Ok(())
    }

    /// A time-limited GET URL for the media's object.
    pub async fn generate_signed_url(&self, id: &Uuid, ttl_seconds: Option<u64>) -> Result<String, AppError> {
        let ttl = ttl_seconds.unwrap_or(DEFAULT_SIGNED_URL_TTL_SECS);
        if ttl == 0 || ttl > MAX_SIGNED_URL_TTL_SECS {
            return Err(AppError::InvalidInput(format!(
                "Signed URL expiry must be between 1 and {} seconds, got {}",
                MAX_SIGNED_URL_TTL_SECS, ttl
            )));
        }

        let media = self.media_repo.get_media_by_id(id).await?;
        let (folder, file_name) = signing_location(&media.url);
        let key = build_key(folder.unwrap_or_default(), file_name);

        let url = self.storage.presign_get(&key, ttl).await?;
        Ok(url)
    }

    pub async fn media_stats(&self) -> Result<MediaStats, AppError> {
        let media = self.media_repo.get_all_media().await?;
        Ok(MediaStats::from_media(&media))
    }

    /// Only the alt text is editable after upload.
    pub async fn update_media_alt(&self, id: &Uuid, alt: Option<String>) -> Result<Media, AppError> {
        let alt = alt.map(|a| a.trim().to_string()).filter(|a| !a.is_empty());
        self.media_repo.update_media_alt(id, alt).await
    }
}

/// Drops content-type parameters (`; charset=...`) and lower-cases the rest.
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn validate_upload(byte_length: u64, content_type: &str) -> Result<(), AppError> {
    if byte_length > MAX_UPLOAD_BYTES {
        return Err(AppError::InvalidInput(format!(
            "File size exceeds maximum allowed size of {}MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }

    if !allowed_mime_types().any(|allowed| allowed == content_type) {
        let allowed = allowed_mime_types().collect::<Vec<_>>().join(", ");
        return Err(AppError::InvalidInput(format!(
            "File type {} is not allowed. Allowed types: {}",
            content_type, allowed
        )));
    }

    Ok(())
}

/// A caller-chosen folder must be one segment of `[A-Za-z0-9_-]`, so the
/// key survives the trip through the stored URL and back.
fn explicit_folder(folder: Option<&str>) -> Result<Option<&str>, AppError> {
    let Some(folder) = folder.map(|f| f.trim().trim_matches('/')).filter(|f| !f.is_empty()) else {
        return Ok(None);
    };

    let valid = folder
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::InvalidInput(format!(
            "Folder '{}' is not allowed. Use a single segment of letters, digits, '-' or '_'",
            folder
        )));
    }

    Ok(Some(folder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mockall::predicate::eq;

    use crate::{
        db::memory::InMemoryDatabase,
        entities::media::MediaKind,
        errors::StorageError,
        storage::memory::InMemoryMediaStorage,
        repositories::{
            media::MockMediaRepository,
            media_store::{MockMediaStorage, StoredReference},
        },
    };

    const BUCKET: &str = "portfolio";

    fn upload(content_type: &str, byte_length: u64) -> UploadMedia {
        UploadMedia {
            body: Bytes::new(),
            original_name: "logo.png".into(),
            content_type: content_type.into(),
            byte_length,
            uploaded_by: Some("admin".into()),
            alt: Some("Logo".into()),
            folder: None,
        }
    }

    fn stored_media(url: &str) -> Media {
        MediaInsert {
            id: Uuid::new_v4(),
            kind: MediaKind::Photo,
            url: url.into(),
            alt: None,
            original_name: "logo.png".into(),
            file_name: "1-abcdefgh.png".into(),
            mime_type: "image/png".into(),
            size: 4,
            uploaded_at: Utc::now(),
            uploaded_by: None,
        }
        .into_media()
    }

    fn handler(repo: MockMediaRepository, storage: MockMediaStorage) -> MediaHandler {
        MediaHandler::new(Arc::new(repo), Arc::new(storage), BUCKET)
    }

    fn accepting_storage() -> MockMediaStorage {
        let mut storage = MockMediaStorage::new();
        storage.expect_put().returning(|key, _, _, _| {
            Ok(StoredReference {
                key: key.to_string(),
                url: format!("https://portfolio.s3.amazonaws.com/{}", key),
            })
        });
        storage
    }

    fn echoing_repo() -> MockMediaRepository {
        let mut repo = MockMediaRepository::new();
        repo.expect_create_media()
            .returning(|insert| Ok(insert.clone().into_media()));
        repo
    }

    #[tokio::test]
    async fn upload_stores_photo_under_images() {
        let media = handler(echoing_repo(), accepting_storage())
            .upload_media(upload("image/png", 4))
            .await
            .unwrap();

        assert_eq!(media.kind, MediaKind::Photo);
        assert!(media.url.starts_with("https://portfolio.s3.amazonaws.com/images/"));
        assert!(media.file_name.ends_with(".png"));
        assert_eq!(media.original_name, "logo.png");
        assert_eq!(media.project_id, None);
    }

    #[tokio::test]
    async fn upload_of_exactly_the_limit_is_accepted() {
        let media = handler(echoing_repo(), accepting_storage())
            .upload_media(upload("video/mp4", MAX_UPLOAD_BYTES))
            .await
            .unwrap();

        assert_eq!(media.size as u64, MAX_UPLOAD_BYTES);
        assert_eq!(media.kind, MediaKind::Video);
    }

    #[tokio::test]
    async fn upload_over_the_limit_touches_nothing() {
        let mut storage = MockMediaStorage::new();
        storage.expect_put().never();
        let mut repo = MockMediaRepository::new();
        repo.expect_create_media().never();

        let err = handler(repo, storage)
            .upload_media(upload("image/png", MAX_UPLOAD_BYTES + 1))
            .await
            .unwrap_err();

        match err {
            AppError::InvalidInput(msg) => assert!(msg.contains("50MB")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn disallowed_type_names_the_type() {
        let mut storage = MockMediaStorage::new();
        storage.expect_put().never();

        let err = handler(MockMediaRepository::new(), storage)
            .upload_media(upload("application/zip", 10))
            .await
            .unwrap_err();

        match err {
            AppError::InvalidInput(msg) => {
                assert!(msg.contains("application/zip"));
                assert!(msg.contains("image/png"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn explicit_folder_overrides_derived_one() {
        let mut request = upload("text/plain; charset=utf-8", 3);
        request.folder = Some("/resumes/".into());

        let media = handler(echoing_repo(), accepting_storage())
            .upload_media(request)
            .await
            .unwrap();

        assert!(media.url.contains("/resumes/"));
        assert_eq!(media.mime_type, "text/plain");
        assert_eq!(media.kind, MediaKind::Document);
    }

    #[tokio::test]
    async fn folder_that_would_not_round_trip_is_rejected() {
        for folder in ["a#b", "a?b", "../x", "projects/2024", "my folder", "a%2Fb", "."] {
            let mut storage = MockMediaStorage::new();
            storage.expect_put().never();
            let mut repo = MockMediaRepository::new();
            repo.expect_create_media().never();

            let mut request = upload("image/png", 4);
            request.folder = Some(folder.into());

            let err = handler(repo, storage).upload_media(request).await.unwrap_err();
            match err {
                AppError::InvalidInput(msg) => assert!(msg.contains(folder), "{msg}"),
                other => panic!("unexpected error for {folder}: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn signed_and_deleted_keys_match_the_uploaded_key() {
        let storage = Arc::new(InMemoryMediaStorage::new(BUCKET, "s3.amazonaws.com"));
        let service = MediaHandler::new(Arc::new(InMemoryDatabase::new()), storage.clone(), BUCKET);

        for folder in [None, Some("resumes"), Some("/press-kit/"), Some("shots_2024")] {
            let body = Bytes::from_static(b"png!");
            let media = service
                .upload_media(UploadMedia {
                    body,
                    byte_length: 4,
                    folder: folder.map(String::from),
                    ..upload("image/png", 4)
                })
                .await
                .unwrap();
            let key = extract_key_from_url(&media.url, BUCKET).unwrap();
            assert!(storage.contains(&key), "{key} not stored");

            let signed = service.generate_signed_url(&media.id, None).await.unwrap();
            assert!(signed.starts_with(&format!("{}?", media.url)), "{signed} does not sign {key}");

            service.delete_media(&media.id).await.unwrap();
            assert!(!storage.contains(&key), "{key} left behind");
        }

        assert_eq!(storage.object_count(), 0);
    }

    #[tokio::test]
    async fn storage_failure_skips_the_insert() {
        let mut storage = MockMediaStorage::new();
        storage.expect_put().returning(|key, _, _, _| {
            Err(StorageError::Upload { key: key.to_string(), message: "access denied".into() })
        });
        let mut repo = MockMediaRepository::new();
        repo.expect_create_media().never();

        let err = handler(repo, storage)
            .upload_media(upload("image/png", 4))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StorageFailure(_)));
    }

    #[tokio::test]
    async fn delete_removes_object_then_row() {
        let media = stored_media("https://portfolio.s3.amazonaws.com/images/1-abcdefgh.png");
        let id = media.id;

        let mut repo = MockMediaRepository::new();
        repo.expect_get_media_by_id().returning(move |_| Ok(media.clone()));
        repo.expect_delete_media().with(eq(id)).times(1).returning(|_| Ok(()));

        let mut storage = MockMediaStorage::new();
        storage
            .expect_delete()
            .withf(|key| key == "images/1-abcdefgh.png")
            .times(1)
            .returning(|_| Ok(()));

        handler(repo, storage).delete_media(&id).await.unwrap();
    }

    #[tokio::test]
    async fn delete_with_foreign_url_aborts_before_any_removal() {
        let media = stored_media("https://cdn.example.com/images/1-abcdefgh.png");
        let id = media.id;

        let mut repo = MockMediaRepository::new();
        repo.expect_get_media_by_id().returning(move |_| Ok(media.clone()));
        repo.expect_delete_media().never();

        let mut storage = MockMediaStorage::new();
        storage.expect_delete().never();

        let err = handler(repo, storage).delete_media(&id).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn delete_of_missing_media_is_not_found() {
        let mut repo = MockMediaRepository::new();
        repo.expect_get_media_by_id()
            .returning(|id| Err(AppError::NotFound(format!("Media not found with id: {}", id))));

        let err = handler(repo, MockMediaStorage::new())
            .delete_media(&Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn signed_url_uses_folder_and_file_name() {
        let media = stored_media("https://portfolio.s3.amazonaws.com/images/1-abcdefgh.png");
        let id = media.id;

        let mut repo = MockMediaRepository::new();
        repo.expect_get_media_by_id().returning(move |_| Ok(media.clone()));

        let mut storage = MockMediaStorage::new();
        storage
            .expect_presign_get()
            .withf(|key, ttl| key == "images/1-abcdefgh.png" && *ttl == DEFAULT_SIGNED_URL_TTL_SECS)
            .returning(|key, ttl| Ok(format!("https://signed/{}?X-Amz-Expires={}", key, ttl)));

        let url = handler(repo, storage).generate_signed_url(&id, None).await.unwrap();

        assert_eq!(url, "https://signed/images/1-abcdefgh.png?X-Amz-Expires=3600");
    }

    #[tokio::test]
    async fn signed_url_rejects_out_of_range_ttl() {
        let service = handler(MockMediaRepository::new(), MockMediaStorage::new());

        for ttl in [0, MAX_SIGNED_URL_TTL_SECS + 1] {
            let err = service.generate_signed_url(&Uuid::new_v4(), Some(ttl)).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn stats_are_computed_from_all_media() {
        let mut repo = MockMediaRepository::new();
        repo.expect_get_all_media().returning(|| {
            Ok(vec![
                stored_media("https://portfolio.s3.amazonaws.com/images/a.png"),
                stored_media("https://portfolio.s3.amazonaws.com/images/b.png"),
            ])
        });

        let stats = handler(repo, MockMediaStorage::new()).media_stats().await.unwrap();

        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.total_size_bytes, 8);
        assert_eq!(stats.count_by_kind.get(&MediaKind::Photo), Some(&2));
    }

    #[tokio::test]
    async fn blank_alt_text_is_cleared() {
        let mut repo = MockMediaRepository::new();
        repo.expect_update_media_alt()
            .withf(|_, alt| alt.is_none())
            .returning(|_, _| Ok(stored_media("https://portfolio.s3.amazonaws.com/images/a.png")));

        handler(repo, MockMediaStorage::new())
            .update_media_alt(&Uuid::new_v4(), Some("   ".into()))
            .await
            .unwrap();
    }
}
