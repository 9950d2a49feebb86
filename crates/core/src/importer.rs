//! Folder scanning for the bulk picture importer.
//!
//! Walks an image directory, collecting supported image files and deriving
//! each picture's display name from its path relative to an image root.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::CoreError;

// ── Constants ────────────────────────────────────────────────────────

/// Maximum folder nesting depth before the scanner stops recursing.
pub const MAX_FOLDER_DEPTH: usize = 10;

/// Image file extensions recognised by the importer.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "tiff", "bmp", "gif"];

// ── Types ────────────────────────────────────────────────────────────

/// An image file discovered during a folder scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedImage {
    /// Absolute (or caller-relative) path used to read the file.
    pub path: PathBuf,
    /// Path relative to the image root with `/` separators. Used as the
    /// picture's display name.
    pub display_name: String,
    /// Lowercase extension without the dot.
    pub extension: String,
    pub size_bytes: u64,
}

/// Outcome counters for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub scanned: usize,
    pub registered: usize,
    pub duplicates: usize,
    pub failed: usize,
}

// ── Pure Functions ───────────────────────────────────────────────────

/// Returns `true` if `extension` (case-insensitive) is a supported image type.
pub fn is_image_extension(extension: &str) -> bool {
    let ext = extension.to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Hidden files (dot-prefixed) and common OS metadata files are skipped.
pub fn is_hidden_or_system(name: &str) -> bool {
    name.starts_with('.') || name == "Thumbs.db" || name == "desktop.ini"
}

/// Display name of `path` relative to `root`, with `/` separators.
pub fn display_name(root: &Path, path: &Path) -> Result<String, CoreError> {
    let relative = path.strip_prefix(root).map_err(|_| {
        CoreError::Validation(format!(
            "'{}' is not inside image root '{}'",
            path.display(),
            root.display()
        ))
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Ok(parts.join("/"))
}

// ── Scanning ─────────────────────────────────────────────────────────

/// Recursively collect image files under `directory`.
///
/// Display names are relative to `root`, which must contain `directory`.
/// Results are sorted by display name so repeated runs are deterministic.
pub async fn scan_image_folder(
    directory: &Path,
    root: &Path,
    max_depth: usize,
) -> Result<Vec<ScannedImage>, CoreError> {
    if !directory.starts_with(root) {
        return Err(CoreError::Validation(format!(
            "directory '{}' is not inside image root '{}'",
            directory.display(),
            root.display()
        )));
    }
    let meta = tokio::fs::metadata(directory)
        .await
        .map_err(|e| CoreError::Validation(format!("cannot read '{}': {e}", directory.display())))?;
    if !meta.is_dir() {
        return Err(CoreError::Validation(format!(
            "'{}' is not a directory",
            directory.display()
        )));
    }

    let mut images = Vec::new();
    scan_recursive(root, directory, &mut images, 0, max_depth).await?;
    images.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    Ok(images)
}

async fn scan_recursive(
    root: &Path,
    current: &Path,
    images: &mut Vec<ScannedImage>,
    depth: usize,
    max_depth: usize,
) -> Result<(), CoreError> {
    if depth > max_depth {
        return Ok(());
    }

    let mut entries = tokio::fs::read_dir(current)
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to read directory: {e}")))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to read entry: {e}")))?
    {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if is_hidden_or_system(&name) {
            continue;
        }

        let file_type = entry
            .file_type()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to read file type: {e}")))?;

        if file_type.is_dir() {
            Box::pin(scan_recursive(root, &path, images, depth + 1, max_depth)).await?;
            continue;
        }

        let ext = path
            .extension()
            .unwrap_or_default()
            .to_string_lossy()
            .to_lowercase();
        if !is_image_extension(&ext) {
            continue;
        }

        let metadata = entry
            .metadata()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to read metadata: {e}")))?;

        images.push(ScannedImage {
            display_name: display_name(root, &path)?,
            path,
            extension: ext,
            size_bytes: metadata.len(),
        });
    }

    Ok(())
}
