//! Polygon segmentation result models and DTOs.
//!
//! Triangles, segments, and vertices are stored in the flat string formats
//! described in [`polyseg_core::polygon`]. Counts and reward are derived on
//! insert and the row is not updated afterwards.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use polyseg_core::error::CoreError;
use polyseg_core::polygon::{self, PolygonGeometry};
use polyseg_core::result::SuppliedFields;
use polyseg_core::shape::ShapeType;
use polyseg_core::types::{DbId, Timestamp};

use crate::models::picture::PictureEntry;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `polygon_results` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PolygonResult {
    pub id: DbId,
    pub picture_id: DbId,
    pub submitted_shape_id: Option<DbId>,
    pub user_id: DbId,
    pub mturk_assignment: Option<String>,
    pub time_ms: Option<i64>,
    pub time_active_ms: Option<i64>,
    pub shape_type: String,
    pub vertices: String,
    pub num_vertices: i32,
    pub triangles: String,
    pub num_triangles: i32,
    pub segments: String,
    pub num_segments: i32,
    pub reward: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PolygonResult {
    pub fn shape_type(&self) -> Result<ShapeType, CoreError> {
        ShapeType::from_code(&self.shape_type)
    }

    /// All line segments as SVG path data (`M x0,y0 L x1,y1` per segment).
    pub fn segments_svg_path(&self) -> Result<String, CoreError> {
        polygon::segments_svg_path(&self.vertices, &self.segments)
    }

    /// Rendering summary.
    ///
    /// Triangles and counts are left out: the viewer only draws outlines.
    pub fn entry(&self) -> PolygonResultEntry {
        PolygonResultEntry {
            id: self.id,
            vertices: self.vertices.clone(),
            segments: self.segments.clone(),
            picture: PictureEntry {
                id: self.picture_id,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for creating a polygon result. Counts and reward are optional and
/// derived when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePolygonResult {
    pub picture_id: DbId,
    pub submitted_shape_id: Option<DbId>,
    pub user_id: DbId,
    pub mturk_assignment: Option<String>,
    pub time_ms: Option<i64>,
    pub time_active_ms: Option<i64>,
    pub shape_type: ShapeType,
    #[serde(flatten)]
    pub geometry: PolygonGeometry,
    pub num_vertices: Option<i32>,
    pub num_triangles: Option<i32>,
    pub num_segments: Option<i32>,
    pub reward: Option<f64>,
}

impl CreatePolygonResult {
    pub fn supplied_fields(&self) -> SuppliedFields {
        SuppliedFields {
            num_vertices: self.num_vertices,
            num_triangles: self.num_triangles,
            num_segments: self.num_segments,
            reward: self.reward,
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Client-side rendering summary of a polygon result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolygonResultEntry {
    pub id: DbId,
    pub vertices: String,
    pub segments: String,
    pub picture: PictureEntry,
}
