//! Shape (annotation target) types.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Experiment slug for material segmentation tasks.
pub const SLUG_SEGMENT_MATERIAL: &str = "segment_material";

/// Experiment slug for object segmentation tasks.
pub const SLUG_SEGMENT_OBJECT: &str = "segment_object";

/// What a polygon outlines. Stored as a single-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    Material,
    Object,
}

impl ShapeType {
    /// Database code for this shape type.
    pub fn code(self) -> &'static str {
        match self {
            Self::Material => "M",
            Self::Object => "O",
        }
    }

    /// Parse from the database code.
    pub fn from_code(code: &str) -> Result<Self, CoreError> {
        match code {
            "M" => Ok(Self::Material),
            "O" => Ok(Self::Object),
            other => Err(CoreError::Validation(format!(
                "Unknown shape type code '{other}'. Must be one of: M, O"
            ))),
        }
    }

    /// Classify an experiment slug. Returns `None` for unrecognised slugs.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            SLUG_SEGMENT_MATERIAL => Some(Self::Material),
            SLUG_SEGMENT_OBJECT => Some(Self::Object),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_map_to_shape_types() {
        assert_eq!(ShapeType::from_slug("segment_material"), Some(ShapeType::Material));
        assert_eq!(ShapeType::from_slug("segment_object"), Some(ShapeType::Object));
        assert_eq!(ShapeType::from_slug("segment_scene"), None);
    }

    #[test]
    fn code_round_trips() {
        for st in [ShapeType::Material, ShapeType::Object] {
            assert_eq!(ShapeType::from_code(st.code()).unwrap(), st);
        }
        assert!(ShapeType::from_code("X").is_err());
    }
}
