use std::collections::BTreeMap;

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "media_kind", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    Photo,
    Video,
    Pdf,
    Document,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Media {
    pub id: Uuid,
    pub kind: MediaKind,
    pub url: String,
    pub alt: Option<String>,
    pub original_name: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Option<String>,
    pub project_id: Option<Uuid>,
}

impl Media {
    /// Human readable size, e.g. `1.2 MB`.
    pub fn formatted_size(&self) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit = 0;

        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }

        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[derive(Debug, Clone)]
pub struct MediaInsert {
    pub id: Uuid,
    pub kind: MediaKind,
    pub url: String,
    pub alt: Option<String>,
    pub original_name: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Option<String>,
}

impl MediaInsert {
    pub fn into_media(self) -> Media {
        Media {
            id: self.id,
            kind: self.kind,
            url: self.url,
            alt: self.alt,
            original_name: self.original_name,
            file_name: self.file_name,
            mime_type: self.mime_type,
            size: self.size,
            uploaded_at: self.uploaded_at,
            uploaded_by: self.uploaded_by,
            project_id: None,
        }
    }
}

// ───── Upload Input ─────────────────────────────────────────────────

/// A file handed to the media lifecycle, already read from the request.
#[derive(Debug, Clone)]
pub struct UploadMedia {
    pub body: Bytes,
    pub original_name: String,
    pub content_type: String,
    pub byte_length: u64,
    pub uploaded_by: Option<String>,
    pub alt: Option<String>,
    pub folder: Option<String>,
}

#[derive(Debug, MultipartForm)]
pub struct MediaUploadForm {
    #[multipart(rename = "file", limit = "64MiB")]
    pub file: TempFile,

    #[multipart(rename = "alt")]
    pub alt: Option<Text<String>>,

    #[multipart(rename = "folder")]
    pub folder: Option<Text<String>>,

    #[multipart(rename = "uploadedBy")]
    pub uploaded_by: Option<Text<String>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMediaRequest {
    #[validate(length(max = 255, message = "Alt text cannot exceed 255 characters"))]
    pub alt: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlQuery {
    pub expires_in: Option<u64>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    pub alt: Option<String>,
    pub original_name: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub formatted_size: String,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Option<String>,
    pub project_id: Option<Uuid>,
}

impl From<Media> for MediaResponse {
    fn from(media: Media) -> Self {
        let formatted_size = media.formatted_size();
        MediaResponse {
            id: media.id,
            kind: media.kind,
            url: media.url,
            alt: media.alt,
            original_name: media.original_name,
            file_name: media.file_name,
            mime_type: media.mime_type,
            size: media.size,
            formatted_size,
            uploaded_at: media.uploaded_at,
            uploaded_by: media.uploaded_by,
            project_id: media.project_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub signed_url: String,
    pub expires_in: u64,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStats {
    pub total_count: u64,
    pub total_size_bytes: u64,
    pub count_by_kind: BTreeMap<MediaKind, u64>,
}

impl MediaStats {
    pub fn from_media<'a>(media: impl IntoIterator<Item = &'a Media>) -> Self {
        media.into_iter().fold(MediaStats::default(), |mut stats, item| {
            stats.total_count += 1;
            stats.total_size_bytes += item.size.max(0) as u64;
            *stats.count_by_kind.entry(item.kind).or_insert(0) += 1;
            stats
        })
    }
}
