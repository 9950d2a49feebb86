//! Flat comma-separated polygon formats stored on segmentation results.
//!
//! All three lists are kept as plain strings so they can be embedded into
//! client-side scripts without re-encoding:
//!
//! - vertices:  `x1,y1,x2,y2,...` (coordinates are fractions of image width/height)
//! - triangles: `p1,p2,p3,p2,p3,p4,...` (index triples into the vertex list)
//! - segments:  `p1,p2,p2,p3,...` (index pairs into the vertex list, unordered)

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of coordinate tokens per vertex (x, y).
pub const COORDS_PER_VERTEX: usize = 2;

/// Number of vertex indices per triangle.
pub const INDICES_PER_TRIANGLE: usize = 3;

/// Number of vertex indices per line segment.
pub const INDICES_PER_SEGMENT: usize = 2;

/// Separator used by every flat list.
pub const LIST_SEPARATOR: char = ',';

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// The three serialized lists describing one polygon annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    pub vertices: String,
    #[serde(default)]
    pub triangles: String,
    #[serde(default)]
    pub segments: String,
}

/// Counts derived from the token counts of a [`PolygonGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedCounts {
    pub num_vertices: usize,
    pub num_triangles: usize,
    pub num_segments: usize,
}

impl PolygonGeometry {
    /// Derive all counts from the serialized lists.
    ///
    /// Uses integer division, so a trailing partial group is dropped.
    pub fn derived_counts(&self) -> DerivedCounts {
        DerivedCounts {
            num_vertices: derive_vertex_count(&self.vertices),
            num_triangles: derive_triangle_count(&self.triangles),
            num_segments: derive_segment_count(&self.segments),
        }
    }

    /// Check that every triangle and segment index refers to an existing vertex.
    pub fn validate_indices(&self) -> Result<(), CoreError> {
        let num_vertices = derive_vertex_count(&self.vertices);
        let triangles = parse_indices(&self.triangles, "triangles")?;
        validate_index_bounds(&triangles, num_vertices, "triangles")?;
        let segments = parse_indices(&self.segments, "segments")?;
        validate_index_bounds(&segments, num_vertices, "segments")
    }

    /// All line segments as SVG path data. See [`segments_svg_path`].
    pub fn segments_svg_path(&self) -> Result<String, CoreError> {
        segments_svg_path(&self.vertices, &self.segments)
    }
}

// ---------------------------------------------------------------------------
// Token counting
// ---------------------------------------------------------------------------

/// Number of comma-separated tokens in `list`. An empty list has none.
pub fn token_count(list: &str) -> usize {
    if list.trim().is_empty() {
        0
    } else {
        list.split(LIST_SEPARATOR).count()
    }
}

/// Vertex count of a serialized vertex list (`tokens / 2`, remainder dropped).
pub fn derive_vertex_count(vertices: &str) -> usize {
    token_count(vertices) / COORDS_PER_VERTEX
}

/// Triangle count of a serialized triangle list (`tokens / 3`, remainder dropped).
pub fn derive_triangle_count(triangles: &str) -> usize {
    token_count(triangles) / INDICES_PER_TRIANGLE
}

/// Segment count of a serialized segment list (`tokens / 2`, remainder dropped).
pub fn derive_segment_count(segments: &str) -> usize {
    token_count(segments) / INDICES_PER_SEGMENT
}

// ---------------------------------------------------------------------------
// Parsing / formatting
// ---------------------------------------------------------------------------

/// Serialize numeric coordinates into a flat vertex list.
///
/// `f64`'s `Display` is the shortest string that parses back to the same
/// value, so no precision is lost.
pub fn format_coordinates(coords: &[f64]) -> String {
    let mut out = String::new();
    for (i, c) in coords.iter().enumerate() {
        if i > 0 {
            out.push(LIST_SEPARATOR);
        }
        let _ = write!(out, "{c}");
    }
    out
}

/// Parse a flat index list (`triangles` or `segments`) into vertex indices.
pub fn parse_indices(list: &str, field: &str) -> Result<Vec<usize>, CoreError> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }
    list.split(LIST_SEPARATOR)
        .enumerate()
        .map(|(i, token)| {
            token.trim().parse::<usize>().map_err(|_| {
                CoreError::Validation(format!(
                    "{field}[{i}] is not a vertex index: '{token}'"
                ))
            })
        })
        .collect()
}

/// Ensure `0 <= idx < num_vertices` for every index.
pub fn validate_index_bounds(
    indices: &[usize],
    num_vertices: usize,
    field: &str,
) -> Result<(), CoreError> {
    match indices.iter().position(|&idx| idx >= num_vertices) {
        Some(pos) => Err(CoreError::Validation(format!(
            "{field}[{pos}] = {} is out of range for {num_vertices} vertices",
            indices[pos]
        ))),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// SVG
// ---------------------------------------------------------------------------

/// Render every segment as an SVG `M x0,y0 L x1,y1` fragment.
///
/// Coordinates are copied verbatim from the vertex string rather than
/// re-parsed, so the original precision is preserved. Fragments are
/// concatenated in segment order with no separator.
pub fn segments_svg_path(vertices: &str, segments: &str) -> Result<String, CoreError> {
    let coords: Vec<&str> = if vertices.trim().is_empty() {
        Vec::new()
    } else {
        vertices.split(LIST_SEPARATOR).collect()
    };
    let indices = parse_indices(segments, "segments")?;
    if indices.len() % INDICES_PER_SEGMENT != 0 {
        return Err(CoreError::Validation(format!(
            "segments has {} indices, expected an even number",
            indices.len()
        )));
    }

    let num_vertices = coords.len() / COORDS_PER_VERTEX;
    validate_index_bounds(&indices, num_vertices, "segments")?;

    let mut path = String::new();
    for pair in indices.chunks_exact(INDICES_PER_SEGMENT) {
        let v0 = COORDS_PER_VERTEX * pair[0];
        let v1 = COORDS_PER_VERTEX * pair[1];
        let _ = write!(
            path,
            "M{},{}L{},{}",
            coords[v0],
            coords[v0 + 1],
            coords[v1],
            coords[v1 + 1]
        );
    }
    Ok(path)
}
