//! Repository for the `pictures` table.

use sqlx::PgPool;
use polyseg_core::types::DbId;

use crate::models::picture::{CreatePicture, Picture};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, file_path, name, content_hash, created_at, updated_at";

/// Provides CRUD operations for pictures.
pub struct PictureRepo;

impl PictureRepo {
    /// Insert a new picture, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePicture) -> Result<Picture, sqlx::Error> {
        let query = format!(
            "INSERT INTO pictures (file_path, name, content_hash)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Picture>(&query)
            .bind(&input.file_path)
            .bind(&input.name)
            .bind(&input.content_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a picture by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Picture>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pictures WHERE id = $1");
        sqlx::query_as::<_, Picture>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the oldest picture with the given content hash, if any.
    pub async fn find_by_content_hash(
        pool: &PgPool,
        content_hash: &str,
    ) -> Result<Option<Picture>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pictures
             WHERE content_hash = $1
             ORDER BY id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, Picture>(&query)
            .bind(content_hash)
            .fetch_optional(pool)
            .await
    }

    /// List pictures in insertion order.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Picture>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pictures
             ORDER BY id ASC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Picture>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of registered pictures.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pictures")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
