use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// 50 MiB
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Multipart ceiling; larger than `MAX_UPLOAD_BYTES` so the size check can name its limit.
pub const MULTIPART_TOTAL_LIMIT: usize = 64 * 1024 * 1024;

pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3600;

/// S3 refuses presigned URLs valid for more than seven days.
pub const MAX_SIGNED_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

pub const ALLOWED_VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/mpeg",
    "video/quicktime",
    "video/webm",
];

pub const ALLOWED_DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

pub fn allowed_mime_types() -> impl Iterator<Item = &'static str> {
    ALLOWED_IMAGE_TYPES
        .iter()
        .chain(ALLOWED_VIDEO_TYPES)
        .chain(ALLOWED_DOCUMENT_TYPES)
        .copied()
}
