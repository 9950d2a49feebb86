//! Derived fields of a segmentation result, filled in on first save.
//!
//! Counts and reward are only computed when the caller leaves them unset.
//! Supplied counts must agree with the serialized lists, and every index
//! must refer to an existing vertex.

use crate::error::CoreError;
use crate::polygon::PolygonGeometry;
use crate::reward::{RewardInput, RewardPolicy};
use crate::shape::ShapeType;

/// Fields a caller may set explicitly before the first save.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppliedFields {
    pub num_vertices: Option<i32>,
    pub num_triangles: Option<i32>,
    pub num_segments: Option<i32>,
    pub reward: Option<f64>,
}

/// Fully resolved derived fields, ready to persist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFields {
    pub num_vertices: i32,
    pub num_triangles: i32,
    pub num_segments: i32,
    pub reward: f64,
}

/// Resolve counts and reward for a result about to be created.
pub fn derive_fields(
    geometry: &PolygonGeometry,
    shape_type: ShapeType,
    supplied: SuppliedFields,
    policy: &dyn RewardPolicy,
) -> Result<DerivedFields, CoreError> {
    geometry.validate_indices()?;

    let counts = geometry.derived_counts();
    let num_vertices = resolve_count("num_vertices", supplied.num_vertices, counts.num_vertices)?;
    let num_triangles =
        resolve_count("num_triangles", supplied.num_triangles, counts.num_triangles)?;
    let num_segments = resolve_count("num_segments", supplied.num_segments, counts.num_segments)?;

    let reward = match supplied.reward {
        Some(r) if !r.is_finite() || r < 0.0 => {
            return Err(CoreError::Validation(format!(
                "reward must be a non-negative finite number, got {r}"
            )));
        }
        Some(r) => r,
        None => policy.reward(&RewardInput { shape_type, counts }),
    };

    Ok(DerivedFields {
        num_vertices,
        num_triangles,
        num_segments,
        reward,
    })
}

fn resolve_count(field: &str, supplied: Option<i32>, derived: usize) -> Result<i32, CoreError> {
    let derived = i32::try_from(derived)
        .map_err(|_| CoreError::Validation(format!("{field} overflows: {derived}")))?;
    match supplied {
        None => Ok(derived),
        Some(n) if n == derived => Ok(n),
        Some(n) => Err(CoreError::Validation(format!(
            "{field} = {n} does not match the serialized list ({derived})"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::FixedReward;
    use assert_matches::assert_matches;

    fn square() -> PolygonGeometry {
        PolygonGeometry {
            vertices: "0,0,1,0,1,1,0,1".into(),
            triangles: "0,1,2,0,2,3".into(),
            segments: "0,1,1,2,2,3,3,0".into(),
        }
    }

    #[test]
    fn unset_fields_are_derived() {
        let fields = derive_fields(
            &square(),
            ShapeType::Object,
            SuppliedFields::default(),
            &FixedReward(0.04),
        )
        .unwrap();
        assert_eq!(
            fields,
            DerivedFields {
                num_vertices: 4,
                num_triangles: 2,
                num_segments: 4,
                reward: 0.04,
            }
        );
    }

    #[test]
    fn explicit_reward_is_kept() {
        let supplied = SuppliedFields {
            reward: Some(0.5),
            ..Default::default()
        };
        let fields =
            derive_fields(&square(), ShapeType::Material, supplied, &FixedReward(0.04)).unwrap();
        assert_eq!(fields.reward, 0.5);
    }

    #[test]
    fn matching_explicit_count_is_accepted() {
        let supplied = SuppliedFields {
            num_vertices: Some(4),
            ..Default::default()
        };
        assert!(derive_fields(&square(), ShapeType::Material, supplied, &FixedReward(0.0)).is_ok());
    }

    #[test]
    fn mismatched_explicit_count_is_rejected() {
        let supplied = SuppliedFields {
            num_segments: Some(7),
            ..Default::default()
        };
        assert_matches!(
            derive_fields(&square(), ShapeType::Material, supplied, &FixedReward(0.0)),
            Err(CoreError::Validation(msg)) if msg.contains("num_segments")
        );
    }

    #[test]
    fn out_of_range_triangle_is_rejected() {
        let mut geometry = square();
        geometry.triangles = "0,1,4".into();
        assert_matches!(
            derive_fields(&geometry, ShapeType::Material, SuppliedFields::default(), &FixedReward(0.0)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn negative_reward_is_rejected() {
        let supplied = SuppliedFields {
            reward: Some(-1.0),
            ..Default::default()
        };
        assert!(derive_fields(&square(), ShapeType::Material, supplied, &FixedReward(0.0)).is_err());
    }
}
