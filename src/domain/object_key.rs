//! Storage key derivation for uploaded media and the reverse mapping from a
//! stored object URL back to its key.
//!
//! Uploads are stored under `{folder}/{generated-name}` and referenced by the
//! virtual-hosted URL `https://{bucket}.{host}/{key}`. The path-style form
//! `https://{host}/{bucket}/{key}` is also accepted when mapping back.

use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use url::Url;

use crate::{entities::media::MediaKind, errors::KeyError};

const RANDOM_TOKEN_LEN: usize = 8;

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Coarse media classification from a content type. Never fails.
pub fn classify_kind(content_type: &str) -> MediaKind {
    if content_type.starts_with("image/") {
        MediaKind::Photo
    } else if content_type.starts_with("video/") {
        MediaKind::Video
    } else if content_type == "application/pdf" {
        MediaKind::Pdf
    } else {
        MediaKind::Document
    }
}

/// Default key prefix for a content type.
pub fn derive_folder(content_type: &str) -> &'static str {
    if content_type.starts_with("image/") {
        "images"
    } else if content_type.starts_with("video/") {
        "videos"
    } else if content_type == "application/pdf"
        || content_type == "application/msword"
        || content_type.contains("document")
        || content_type == "text/plain"
    {
        "documents"
    } else {
        "others"
    }
}

/// `<millis>-<8 random chars><extension>`, e.g. `1718000000000-a1b2c3d4.png`.
///
/// The extension keeps its leading dot and is empty when the original name
/// has none. Not suitable as a secret.
pub fn generate_storage_name(original_name: &str) -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_TOKEN_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();

    format!("{}-{}{}", next_millis(), token, file_extension(original_name))
}

/// Wall-clock milliseconds, clamped so the sequence never goes backwards.
fn next_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_MILLIS.fetch_max(now, Ordering::SeqCst);
    previous.max(now)
}

fn file_extension(original_name: &str) -> &str {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(original_name);

    match base.rfind('.') {
        Some(index) => &base[index..],
        None => "",
    }
}

pub fn build_key(folder: &str, file_name: &str) -> String {
    if folder.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", folder, file_name)
    }
}

/// Public reference handed back after an upload.
pub fn object_url(bucket: &str, host: &str, key: &str) -> String {
    format!("https://{}.{}/{}", bucket, host, key)
}

/// Recovers the object key from a URL produced by [`object_url`] or from its
/// path-style equivalent.
pub fn extract_key_from_url(url: &str, bucket: &str) -> Result<String, KeyError> {
    let invalid = || KeyError::InvalidReference(url.to_string());

    let parsed = Url::parse(url).map_err(|_| invalid())?;
    let host = parsed.host_str().ok_or_else(invalid)?;
    let path = parsed.path().trim_start_matches('/');

    let raw_key = if host
        .strip_prefix(bucket)
        .is_some_and(|rest| rest.starts_with('.'))
    {
        path
    } else {
        match path.split_once('/') {
            Some((first, rest)) if first == bucket => rest,
            _ => return Err(invalid()),
        }
    };

    let key = urlencoding::decode(raw_key).map_err(|_| invalid())?;
    if key.is_empty() {
        return Err(invalid());
    }

    Ok(key.into_owned())
}

/// Folder and file name used when presigning a stored URL.
///
/// The file name is the last `/`-separated segment; the folder is the one
/// before it when the URL has more than four segments (scheme, empty, host,
/// folder, file).
pub fn signing_location(url: &str) -> (Option<&str>, &str) {
    let parts: Vec<&str> = url.split('/').collect();
    let file_name = parts.last().copied().unwrap_or_default();
    let folder = if parts.len() > 4 {
        Some(parts[parts.len() - 2])
    } else {
        None
    };

    (folder, file_name)
}
