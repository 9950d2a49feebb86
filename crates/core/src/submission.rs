//! Validation of crowd-worker polygon submissions.
//!
//! Pure logic only: turns a raw payload into a batch of shapes ready for
//! get-or-create. The whole batch is validated before anything is handed
//! to storage, so a malformed polygon never leaves earlier polygons of the
//! same submission persisted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::polygon::{format_coordinates, COORDS_PER_VERTEX};
use crate::shape::ShapeType;
use crate::types::DbId;

/// The only submission protocol version accepted.
pub const SUPPORTED_VERSION: &str = "1.0";

/// Content type recorded in [`ContentKey`] for picture submissions.
pub const CONTENT_TYPE_PICTURE: &str = "picture";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Unknown version: {0}")]
    VersionMismatch(String),

    #[error("Result length mismatch ({polygons} polygons, {times} times)")]
    LengthMismatch { polygons: usize, times: usize },

    #[error("Odd number of vertices ({count}) in polygon {index}")]
    OddVertexCount { index: usize, count: usize },

    #[error("Unknown slug: {0}")]
    UnknownSlug(String),

    #[error("Submission contains no photos")]
    EmptyHit,

    #[error("No {field} submitted for photo {photo_id}")]
    MissingPhotoData { field: &'static str, photo_id: DbId },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Queue error: {0}")]
    Queue(String),
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Raw submission as posted by the labeling client.
///
/// Every mapping is keyed by the photo id rendered as a string.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmissionPayload {
    /// `{photo_id: [[x1,y1,x2,y2,...], ...]}`
    pub results: HashMap<String, Vec<Vec<f64>>>,
    /// Per-polygon elapsed time in milliseconds.
    pub time_ms: HashMap<String, Vec<i64>>,
    /// Per-polygon active time in milliseconds.
    pub time_active_ms: HashMap<String, Vec<i64>>,
    pub version: String,
    #[serde(default)]
    pub mturk_assignment: Option<String>,
}

/// One polygon that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedShape {
    pub vertices: String,
    pub num_vertices: i32,
    pub time_ms: i64,
    pub time_active_ms: i64,
}

/// A submission that passed validation, targeting a single photo.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub photo_id: DbId,
    pub mturk_assignment: Option<String>,
    pub shape_type: ShapeType,
    pub shapes: Vec<ValidatedShape>,
}

/// Key under which newly created shapes are reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContentKey {
    pub content_type: &'static str,
    pub object_id: DbId,
}

impl ContentKey {
    pub fn picture(id: DbId) -> Self {
        Self {
            content_type: CONTENT_TYPE_PICTURE,
            object_id: id,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a submission against the photos of the task it answers.
///
/// Only the first photo is processed; additional photos are ignored.
pub fn validate_submission(
    photo_ids: &[DbId],
    payload: &SubmissionPayload,
    slug: &str,
) -> Result<ValidatedSubmission, SubmitError> {
    if payload.version != SUPPORTED_VERSION {
        return Err(SubmitError::VersionMismatch(payload.version.clone()));
    }

    let photo_id = *photo_ids.first().ok_or(SubmitError::EmptyHit)?;
    let key = photo_id.to_string();

    let polygons = lookup(&payload.results, &key, "results", photo_id)?;
    let times = lookup(&payload.time_ms, &key, "time_ms", photo_id)?;
    let active_times = lookup(&payload.time_active_ms, &key, "time_active_ms", photo_id)?;

    if polygons.len() != times.len() {
        return Err(SubmitError::LengthMismatch {
            polygons: polygons.len(),
            times: times.len(),
        });
    }
    if polygons.len() != active_times.len() {
        return Err(SubmitError::LengthMismatch {
            polygons: polygons.len(),
            times: active_times.len(),
        });
    }

    let shape_type =
        ShapeType::from_slug(slug).ok_or_else(|| SubmitError::UnknownSlug(slug.to_string()))?;

    let shapes = polygons
        .iter()
        .zip(times.iter().zip(active_times))
        .enumerate()
        .map(|(index, (coords, (&time_ms, &time_active_ms)))| {
            validate_polygon(index, coords, time_ms, time_active_ms)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedSubmission {
        photo_id,
        mturk_assignment: payload.mturk_assignment.clone(),
        shape_type,
        shapes,
    })
}

fn lookup<'a, T>(
    map: &'a HashMap<String, Vec<T>>,
    key: &str,
    field: &'static str,
    photo_id: DbId,
) -> Result<&'a [T], SubmitError> {
    map.get(key)
        .map(Vec::as_slice)
        .ok_or(SubmitError::MissingPhotoData { field, photo_id })
}

fn validate_polygon(
    index: usize,
    coords: &[f64],
    time_ms: i64,
    time_active_ms: i64,
) -> Result<ValidatedShape, SubmitError> {
    if coords.len() % COORDS_PER_VERTEX != 0 {
        return Err(SubmitError::OddVertexCount {
            index,
            count: coords.len(),
        });
    }
    let num_vertices = i32::try_from(coords.len() / COORDS_PER_VERTEX)
        .map_err(|_| SubmitError::OddVertexCount {
            index,
            count: coords.len(),
        })?;

    Ok(ValidatedShape {
        vertices: format_coordinates(coords),
        num_vertices,
        time_ms,
        time_active_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn payload(polygons: Vec<Vec<f64>>) -> SubmissionPayload {
        let n = polygons.len();
        SubmissionPayload {
            results: HashMap::from([("7".to_string(), polygons)]),
            time_ms: HashMap::from([("7".to_string(), vec![1200; n])]),
            time_active_ms: HashMap::from([("7".to_string(), vec![900; n])]),
            version: "1.0".into(),
            mturk_assignment: Some("ASSIGN-1".into()),
        }
    }

    #[test]
    fn triangle_yields_one_material_shape() {
        let p = payload(vec![vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0]]);
        let v = validate_submission(&[7], &p, "segment_material").unwrap();
        assert_eq!(v.photo_id, 7);
        assert_eq!(v.shape_type, ShapeType::Material);
        assert_eq!(
            v.shapes,
            vec![ValidatedShape {
                vertices: "0,0,1,0,1,1".into(),
                num_vertices: 3,
                time_ms: 1200,
                time_active_ms: 900,
            }]
        );
        assert_eq!(v.mturk_assignment.as_deref(), Some("ASSIGN-1"));
    }

    #[test]
    fn wrong_version_always_fails_first() {
        let mut p = payload(vec![vec![0.0, 0.0, 1.0]]);
        p.version = "2.0".into();
        assert_matches!(
            validate_submission(&[], &p, "nonsense"),
            Err(SubmitError::VersionMismatch(v)) if v == "2.0"
        );
    }

    #[test]
    fn odd_coordinate_count_fails() {
        let p = payload(vec![vec![0.0, 0.0, 1.0, 0.0, 1.0]]);
        assert_matches!(
            validate_submission(&[7], &p, "segment_material"),
            Err(SubmitError::OddVertexCount { index: 0, count: 5 })
        );
    }

    #[test]
    fn odd_polygon_late_in_batch_rejects_whole_batch() {
        let p = payload(vec![
            vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.5],
        ]);
        assert_matches!(
            validate_submission(&[7], &p, "segment_object"),
            Err(SubmitError::OddVertexCount { index: 1, count: 3 })
        );
    }

    #[test]
    fn time_list_length_mismatch_fails() {
        let mut p = payload(vec![vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0]]);
        p.time_ms.insert("7".into(), vec![]);
        assert_matches!(
            validate_submission(&[7], &p, "segment_material"),
            Err(SubmitError::LengthMismatch { polygons: 1, times: 0 })
        );
    }

    #[test]
    fn active_time_length_mismatch_fails() {
        let mut p = payload(vec![vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0]]);
        p.time_active_ms.insert("7".into(), vec![1, 2]);
        assert_matches!(
            validate_submission(&[7], &p, "segment_material"),
            Err(SubmitError::LengthMismatch { polygons: 1, times: 2 })
        );
    }

    #[test]
    fn unknown_slug_fails() {
        let p = payload(vec![vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0]]);
        assert_matches!(
            validate_submission(&[7], &p, "segment_scene"),
            Err(SubmitError::UnknownSlug(s)) if s == "segment_scene"
        );
    }

    #[test]
    fn empty_hit_fails() {
        let p = payload(vec![]);
        assert_matches!(
            validate_submission(&[], &p, "segment_material"),
            Err(SubmitError::EmptyHit)
        );
    }

    #[test]
    fn missing_photo_key_fails() {
        let p = payload(vec![]);
        assert_matches!(
            validate_submission(&[8], &p, "segment_material"),
            Err(SubmitError::MissingPhotoData { field: "results", photo_id: 8 })
        );
    }

    #[test]
    fn only_first_photo_is_processed() {
        let p = payload(vec![vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0]]);
        let v = validate_submission(&[7, 8, 9], &p, "segment_object").unwrap();
        assert_eq!(v.photo_id, 7);
        assert_eq!(v.shapes.len(), 1);
    }

    #[test]
    fn payload_deserializes_from_client_json() {
        let json = serde_json::json!({
            "results": { "7": [[0.1, 0.2, 0.3, 0.4]] },
            "time_ms": { "7": [1500] },
            "time_active_ms": { "7": [1000] },
            "version": "1.0"
        });
        let p: SubmissionPayload = serde_json::from_value(json).unwrap();
        assert!(p.mturk_assignment.is_none());
        let v = validate_submission(&[7], &p, "segment_object").unwrap();
        assert_eq!(v.shapes[0].vertices, "0.1,0.2,0.3,0.4");
        assert_eq!(v.shapes[0].num_vertices, 2);
    }
}
