//! Submitted shape models: raw worker polygons awaiting triangulation.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use polyseg_core::error::CoreError;
use polyseg_core::shape::ShapeType;
use polyseg_core::submission::{ValidatedShape, ValidatedSubmission};
use polyseg_core::types::{DbId, Timestamp};

/// A row from the `submitted_shapes` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct SubmittedShape {
    pub id: DbId,
    pub picture_id: DbId,
    pub user_id: DbId,
    pub mturk_assignment: Option<String>,
    pub time_ms: i64,
    pub time_active_ms: i64,
    pub vertices: String,
    pub num_vertices: i32,
    /// Single-character code, see [`ShapeType::code`].
    pub shape_type: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SubmittedShape {
    pub fn shape_type(&self) -> Result<ShapeType, CoreError> {
        ShapeType::from_code(&self.shape_type)
    }
}

/// DTO for get-or-create. Every field is part of the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateSubmittedShape {
    pub picture_id: DbId,
    pub user_id: DbId,
    pub mturk_assignment: Option<String>,
    pub time_ms: i64,
    pub time_active_ms: i64,
    pub vertices: String,
    pub num_vertices: i32,
    pub shape_type: ShapeType,
}

impl CreateSubmittedShape {
    /// Build the create DTO for one validated polygon of a submission.
    pub fn from_validated(
        user_id: DbId,
        submission: &ValidatedSubmission,
        shape: &ValidatedShape,
    ) -> Self {
        Self {
            picture_id: submission.photo_id,
            user_id,
            mturk_assignment: submission.mturk_assignment.clone(),
            time_ms: shape.time_ms,
            time_active_ms: shape.time_active_ms,
            vertices: shape.vertices.clone(),
            num_vertices: shape.num_vertices,
            shape_type: submission.shape_type,
        }
    }
}
