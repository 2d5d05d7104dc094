use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path segment as a UUID.
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::InvalidInput(format!("Invalid UUID format: {}", id)))
}
