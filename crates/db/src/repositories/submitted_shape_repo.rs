//! Repository for the `submitted_shapes` table.

use sqlx::PgPool;
use polyseg_core::types::DbId;

use crate::models::submitted_shape::{CreateSubmittedShape, SubmittedShape};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, picture_id, user_id, mturk_assignment, time_ms, time_active_ms, \
    vertices, num_vertices, shape_type, created_at, updated_at";

/// Provides get-or-create and query operations for submitted shapes.
pub struct SubmittedShapeRepo;

impl SubmittedShapeRepo {
    /// Get-or-create every shape in `shapes` inside a single transaction.
    ///
    /// Returns each row paired with `true` if it was inserted by this call.
    /// If any statement fails, nothing is persisted.
    pub async fn get_or_create_batch(
        pool: &PgPool,
        shapes: &[CreateSubmittedShape],
    ) -> Result<Vec<(SubmittedShape, bool)>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut results = Vec::with_capacity(shapes.len());

        for shape in shapes {
            results.push(Self::get_or_create_inner(&mut tx, shape).await?);
        }

        tx.commit().await?;
        Ok(results)
    }

    /// Find a submitted shape by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SubmittedShape>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submitted_shapes WHERE id = $1");
        sqlx::query_as::<_, SubmittedShape>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List submitted shapes for a picture, oldest first.
    pub async fn list_by_picture(
        pool: &PgPool,
        picture_id: DbId,
    ) -> Result<Vec<SubmittedShape>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM submitted_shapes
             WHERE picture_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, SubmittedShape>(&query)
            .bind(picture_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Insert unless an identical shape exists, then read back the row.
    ///
    /// `ON CONFLICT DO NOTHING` makes the insert race-free against the
    /// unique identity index; a concurrent duplicate blocks until the other
    /// transaction commits and then falls through to the select.
    async fn get_or_create_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        shape: &CreateSubmittedShape,
    ) -> Result<(SubmittedShape, bool), sqlx::Error> {
        let insert = format!(
            "INSERT INTO submitted_shapes
                (picture_id, user_id, mturk_assignment, time_ms, time_active_ms,
                 vertices, num_vertices, shape_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, SubmittedShape>(&insert)
            .bind(shape.picture_id)
            .bind(shape.user_id)
            .bind(&shape.mturk_assignment)
            .bind(shape.time_ms)
            .bind(shape.time_active_ms)
            .bind(&shape.vertices)
            .bind(shape.num_vertices)
            .bind(shape.shape_type.code())
            .fetch_optional(&mut **tx)
            .await?;

        if let Some(row) = inserted {
            return Ok((row, true));
        }

        let select = format!(
            "SELECT {COLUMNS} FROM submitted_shapes
             WHERE picture_id = $1
               AND user_id = $2
               AND mturk_assignment IS NOT DISTINCT FROM $3
               AND time_ms = $4
               AND time_active_ms = $5
               AND vertices = $6
               AND num_vertices = $7
               AND shape_type = $8"
        );
        let existing = sqlx::query_as::<_, SubmittedShape>(&select)
            .bind(shape.picture_id)
            .bind(shape.user_id)
            .bind(&shape.mturk_assignment)
            .bind(shape.time_ms)
            .bind(shape.time_active_ms)
            .bind(&shape.vertices)
            .bind(shape.num_vertices)
            .bind(shape.shape_type.code())
            .fetch_one(&mut **tx)
            .await?;
        Ok((existing, false))
    }
}
