//! Picture entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use polyseg_core::types::{DbId, Timestamp};

/// A row from the `pictures` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Picture {
    pub id: DbId,
    pub file_path: String,
    pub name: String,
    pub content_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a picture whose bytes are already stored.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePicture {
    pub file_path: String,
    pub name: String,
    pub content_hash: String,
}

/// Client-side rendering summary. Only the id is sent; the client resolves
/// everything else itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PictureEntry {
    pub id: DbId,
}

impl Picture {
    pub fn entry(&self) -> PictureEntry {
        PictureEntry { id: self.id }
    }
}
