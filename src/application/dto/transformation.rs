//! Transformation result and run metadata

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Rulebook, Scene, StoryEssence};
use crate::domain::value_objects::{RunId, ViolationSummary};

/// Everything a completed run produced, ready to be saved
#[derive(Debug, Clone)]
pub struct TransformationResult {
    pub essence: StoryEssence,
    pub rulebook: Rulebook,
    pub scenes: Vec<Scene>,
    /// Scenes joined with the scene separator
    pub story: String,
    pub violations: ViolationSummary,
    pub metadata: TransformationMetadata,
}

impl TransformationResult {
    /// Words across all scenes, not counting the separators between them
    pub fn word_count(&self) -> usize {
        self.scenes.iter().map(Scene::word_count).sum()
    }
}

/// Stats about how the transformation went
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationMetadata {
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    pub source_story: String,
    pub target_world: String,
    pub total_scenes: usize,
    pub scenes_with_violations: usize,
    pub total_violations: usize,
    /// Attempts rejected by the validator, across all scenes
    pub failed_attempts: usize,
    /// Scenes accepted with violations still present
    pub degraded_scenes: usize,
    pub violation_types: BTreeMap<String, usize>,
    /// Percentage of scenes accepted on the first attempt, e.g. "83.3%"
    pub success_rate_first_try: String,
    pub model_used: String,
    pub total_tokens_estimated: u64,
    pub estimated_cost_usd: f64,
}

/// Share of scenes that needed no correction, formatted to one decimal place
pub fn first_try_success_rate(total_scenes: usize, scenes_with_violations: usize) -> String {
    if total_scenes == 0 {
        return "0.0%".to_string();
    }
    let clean = total_scenes.saturating_sub(scenes_with_violations);
    format!("{:.1}%", clean as f64 / total_scenes as f64 * 100.0)
}
