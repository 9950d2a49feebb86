//! Reward computation for segmentation results.
//!
//! A result's reward is computed once, when the record is first saved
//! without an explicit reward. The policy is pluggable so deployments can
//! swap the payout scheme without touching the save path.

use crate::polygon::DerivedCounts;
use crate::shape::ShapeType;

/// Default base payout per accepted polygon.
pub const DEFAULT_BASE_REWARD: f64 = 0.02;

/// Default bonus per vertex.
pub const DEFAULT_PER_VERTEX_REWARD: f64 = 0.001;

/// Default cap on a single polygon's reward.
pub const DEFAULT_MAX_REWARD: f64 = 0.10;

/// The content a reward is computed from.
#[derive(Debug, Clone, Copy)]
pub struct RewardInput {
    pub shape_type: ShapeType,
    pub counts: DerivedCounts,
}

/// Maps a result's content to a numeric reward.
pub trait RewardPolicy: Send + Sync {
    fn reward(&self, input: &RewardInput) -> f64;
}

/// Pays a base amount plus a per-vertex bonus, capped at `max`.
#[derive(Debug, Clone, Copy)]
pub struct LabelReward {
    pub base: f64,
    pub per_vertex: f64,
    pub max: f64,
}

impl Default for LabelReward {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_REWARD,
            per_vertex: DEFAULT_PER_VERTEX_REWARD,
            max: DEFAULT_MAX_REWARD,
        }
    }
}

impl RewardPolicy for LabelReward {
    fn reward(&self, input: &RewardInput) -> f64 {
        let raw = self.base + self.per_vertex * input.counts.num_vertices as f64;
        raw.min(self.max)
    }
}

/// Pays the same amount regardless of content.
#[derive(Debug, Clone, Copy)]
pub struct FixedReward(pub f64);

impl RewardPolicy for FixedReward {
    fn reward(&self, _input: &RewardInput) -> f64 {
        self.0
    }
}
