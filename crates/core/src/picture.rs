//! Picture registration rules.

use crate::error::CoreError;
use crate::storage::picture_key;

/// Maximum display-name length accepted for a picture.
pub const MAX_PICTURE_NAME_LEN: usize = 1024;

/// Validate a picture display name: required, non-blank, bounded.
pub fn validate_picture_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "picture name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_PICTURE_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "picture name exceeds {MAX_PICTURE_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Everything needed to store and insert a new picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPicture {
    pub name: String,
    pub content_hash: String,
    pub file_path: String,
}

/// Validate `name` and compute the content hash and storage key.
///
/// `known_hash` is used as-is when present; otherwise `hasher` runs over
/// `content`. A picture's hash never changes once computed.
pub fn prepare_picture<H>(
    name: &str,
    extension: &str,
    content: &[u8],
    known_hash: Option<String>,
    hasher: H,
) -> Result<PreparedPicture, CoreError>
where
    H: Fn(&[u8]) -> String,
{
    validate_picture_name(name)?;

    let content_hash = match known_hash {
        Some(h) if !h.is_empty() => h,
        _ => hasher(content),
    };
    let file_path = picture_key(&content_hash, extension);

    Ok(PreparedPicture {
        name: name.to_string(),
        content_hash,
        file_path,
    })
}
