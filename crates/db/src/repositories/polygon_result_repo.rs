//! Repository for the `polygon_results` table.
//!
//! Rows are insert-only. Derived counts and the reward are resolved in
//! [`polyseg_core::result::derive_fields`] before the insert, so a stored
//! row always agrees with its serialized lists.

use sqlx::PgPool;
use polyseg_core::result::derive_fields;
use polyseg_core::reward::RewardPolicy;
use polyseg_core::types::DbId;

use crate::models::polygon_result::{CreatePolygonResult, PolygonResult};
use crate::DbError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, picture_id, submitted_shape_id, user_id, mturk_assignment, \
    time_ms, time_active_ms, shape_type, \
    vertices, num_vertices, triangles, num_triangles, segments, num_segments, \
    reward, created_at, updated_at";

/// Default ordering: by owning picture, newest result first.
const ORDER_BY: &str = "ORDER BY picture_id ASC, created_at DESC, id DESC";

/// Provides create and query operations for polygon results.
pub struct PolygonResultRepo;

impl PolygonResultRepo {
    /// Validate, fill in derived fields, and insert a new result.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePolygonResult,
        reward_policy: &dyn RewardPolicy,
    ) -> Result<PolygonResult, DbError> {
        let derived = derive_fields(
            &input.geometry,
            input.shape_type,
            input.supplied_fields(),
            reward_policy,
        )?;

        let query = format!(
            "INSERT INTO polygon_results
                (picture_id, submitted_shape_id, user_id, mturk_assignment,
                 time_ms, time_active_ms, shape_type,
                 vertices, num_vertices, triangles, num_triangles,
                 segments, num_segments, reward)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PolygonResult>(&query)
            .bind(input.picture_id)
            .bind(input.submitted_shape_id)
            .bind(input.user_id)
            .bind(&input.mturk_assignment)
            .bind(input.time_ms)
            .bind(input.time_active_ms)
            .bind(input.shape_type.code())
            .bind(&input.geometry.vertices)
            .bind(derived.num_vertices)
            .bind(&input.geometry.triangles)
            .bind(derived.num_triangles)
            .bind(&input.geometry.segments)
            .bind(derived.num_segments)
            .bind(derived.reward)
            .fetch_one(pool)
            .await?;

        tracing::debug!(
            result_id = row.id,
            picture_id = row.picture_id,
            num_vertices = row.num_vertices,
            reward = row.reward,
            "Polygon result created",
        );
        Ok(row)
    }

    /// Find a result by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PolygonResult>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM polygon_results WHERE id = $1");
        sqlx::query_as::<_, PolygonResult>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List results in the default order.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PolygonResult>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM polygon_results
             {ORDER_BY}
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, PolygonResult>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List all results for one picture, newest first.
    pub async fn list_by_picture(
        pool: &PgPool,
        picture_id: DbId,
    ) -> Result<Vec<PolygonResult>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM polygon_results
             WHERE picture_id = $1
             {ORDER_BY}"
        );
        sqlx::query_as::<_, PolygonResult>(&query)
            .bind(picture_id)
            .fetch_all(pool)
            .await
    }
}
