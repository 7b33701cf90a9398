//! Story Transformer Service - Runs the three-stage transformation
//!
//! 1. DNA extraction: pull the portable essence out of the source story
//! 2. Rulebook building: map that essence onto the target world
//! 3. Story generation: write one scene per plot beat under constraint
//!    enforcement, each scene seeing the two scenes before it
//!
//! Stages run strictly in order and each completion call is awaited before
//! the next is made. A failure in extraction or rulebook building aborts
//! the run; constraint violations during generation never do.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::application::dto::{
    first_try_success_rate, parse_structured, ParseError, RulebookDto, StoryEssenceDto,
    TransformationMetadata, TransformationResult,
};
use crate::application::ports::outbound::{LlmError, LlmPort, LlmRequest};
use crate::application::services::constraint_enforcement_service::{
    ConstraintEnforcementService, EnforcementPolicy,
};
use crate::application::services::llm::prompt_builder::{
    build_context_window, build_extraction_prompt, build_rulebook_prompt, build_scene_prompt,
    scene_theme, ScenePromptContext,
};
use crate::domain::entities::{assemble_story, Rulebook, Scene, StoryEssence};
use crate::domain::services::{ConstraintValidator, KeywordValidator};
use crate::domain::value_objects::{RunId, ViolationLog};

/// Per-stage temperatures, retry budget, and naming for a run
#[derive(Debug, Clone)]
pub struct TransformerSettings {
    /// Low for consistent extraction
    pub dna_temperature: f32,
    pub rulebook_temperature: f32,
    /// Higher for creative writing
    pub story_temperature: f32,
    pub max_retries: u32,
    pub source_story_name: String,
    pub target_world_name: String,
}

impl Default for TransformerSettings {
    fn default() -> Self {
        Self {
            dna_temperature: 0.3,
            rulebook_temperature: 0.4,
            story_temperature: 0.7,
            max_retries: 2,
            source_story_name: "Unknown Story".to_string(),
            target_world_name: "2045".to_string(),
        }
    }
}

/// Pipeline stage, used to attribute failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    DnaExtraction,
    RulebookBuilding,
    StoryGeneration,
    SavingOutputs,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DnaExtraction => "DNA extraction",
            Self::RulebookBuilding => "rulebook building",
            Self::StoryGeneration => "story generation",
            Self::SavingOutputs => "saving outputs",
        })
    }
}

/// Errors that abort a transformation run
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Error in {stage}: {source}")]
    Llm {
        stage: PipelineStage,
        #[source]
        source: LlmError,
    },
    #[error("Error in {stage}: could not parse response: {source}")]
    Parse {
        stage: PipelineStage,
        #[source]
        source: ParseError,
    },
}

impl TransformError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Llm { stage, .. } | Self::Parse { stage, .. } => *stage,
        }
    }

    fn llm(stage: PipelineStage) -> impl FnOnce(LlmError) -> Self {
        move |source| Self::Llm { stage, source }
    }

    fn parse(stage: PipelineStage) -> impl FnOnce(ParseError) -> Self {
        move |source| Self::Parse { stage, source }
    }
}

/// Orchestrates extraction, rulebook building, and enforced scene generation
pub struct StoryTransformerService<L: LlmPort, V: ConstraintValidator = KeywordValidator> {
    llm: Arc<L>,
    enforcer: ConstraintEnforcementService<L, V>,
    settings: TransformerSettings,
}

impl<L: LlmPort> StoryTransformerService<L> {
    pub fn new(llm: Arc<L>, settings: TransformerSettings) -> Self {
        Self::with_validator(llm, KeywordValidator::new(), settings)
    }
}

impl<L: LlmPort, V: ConstraintValidator> StoryTransformerService<L, V> {
    pub fn with_validator(llm: Arc<L>, validator: V, settings: TransformerSettings) -> Self {
        Self {
            enforcer: ConstraintEnforcementService::with_validator(llm.clone(), validator),
            llm,
            settings,
        }
    }

    /// Stage 1: extract the story's portable essence
    pub async fn extract_essence(&self, story: &str) -> Result<StoryEssence, TransformError> {
        let stage = PipelineStage::DnaExtraction;
        tracing::info!(chars = story.len(), "Extracting story DNA");

        let request = LlmRequest::new(build_extraction_prompt(story))
            .with_temperature(self.settings.dna_temperature)
            .with_json_response();
        let response = self
            .llm
            .generate(request)
            .await
            .map_err(TransformError::llm(stage))?;

        let dto: StoryEssenceDto =
            parse_structured(&response.content).map_err(TransformError::parse(stage))?;
        let essence = StoryEssence::try_from(dto).map_err(TransformError::parse(stage))?;

        tracing::info!(
            themes = essence.themes.len(),
            characters = essence.characters.len(),
            plot_beats = essence.plot_beats.len(),
            "Extracted story DNA"
        );
        Ok(essence)
    }

    /// Stage 2: build the rulebook that maps the essence onto `target_world`
    pub async fn build_rulebook(
        &self,
        essence: &StoryEssence,
        target_world: &str,
    ) -> Result<Rulebook, TransformError> {
        let stage = PipelineStage::RulebookBuilding;
        tracing::info!("Building transformation rulebook");

        let essence_json = serde_json::to_string_pretty(&StoryEssenceDto::from(essence))
            .map_err(|e| TransformError::parse(stage)(ParseError::from(e)))?;

        let request =
            LlmRequest::new(build_rulebook_prompt(&essence_json, target_world, &essence.themes))
                .with_temperature(self.settings.rulebook_temperature)
                .with_json_response();
        let response = self
            .llm
            .generate(request)
            .await
            .map_err(TransformError::llm(stage))?;

        let dto: RulebookDto =
            parse_structured(&response.content).map_err(TransformError::parse(stage))?;
        let rulebook = Rulebook::try_from(dto).map_err(TransformError::parse(stage))?;

        let untranslated = rulebook.untranslated_beats(&essence.plot_beats);
        if !untranslated.is_empty() {
            tracing::warn!(
                beats = ?untranslated,
                "Rulebook has no translation for some beats, using their descriptions"
            );
        }

        tracing::info!(
            constraints = rulebook.constraints.len(),
            character_mappings = rulebook.character_mappings.len(),
            forbidden = rulebook.forbidden_elements.len(),
            "Built transformation rulebook"
        );
        Ok(rulebook)
    }

    /// Stage 3: generate one scene per plot beat, recording violations in `log`
    pub async fn generate_story(
        &self,
        essence: &StoryEssence,
        rulebook: &Rulebook,
        log: &mut ViolationLog,
    ) -> Result<Vec<Scene>, TransformError> {
        let total = essence.plot_beats.len();
        let policy = EnforcementPolicy {
            temperature: self.settings.story_temperature,
            max_retries: self.settings.max_retries,
        };
        let mut scenes: Vec<Scene> = Vec::with_capacity(total);

        for (index, beat) in essence.plot_beats.iter().enumerate() {
            let scene_number = index + 1;
            let previous_context = build_context_window(&scenes);
            let base_prompt = build_scene_prompt(&ScenePromptContext {
                scene_number,
                beat,
                rulebook,
                previous_context: &previous_context,
                theme: scene_theme(essence),
                story_name: &self.settings.source_story_name,
                target_world_name: &self.settings.target_world_name,
            });

            let generation = self
                .enforcer
                .generate_with_enforcement(rulebook, log, &base_prompt, scene_number, policy)
                .await
                .map_err(TransformError::llm(PipelineStage::StoryGeneration))?;

            tracing::info!(
                scene = scene_number,
                total,
                beat = %beat.beat_name,
                attempts = generation.attempts,
                clean = generation.clean,
                truncated = generation.truncated,
                "Generated scene"
            );

            let mut scene = Scene::new(scene_number, beat.beat_name.clone(), generation.text)
                .with_attempts(generation.attempts);
            if !generation.clean {
                scene = scene.degraded();
            }
            scenes.push(scene);
        }

        Ok(scenes)
    }

    /// Assemble the story text, violation summary, and run metadata
    pub fn finalize(
        &self,
        essence: StoryEssence,
        rulebook: Rulebook,
        scenes: Vec<Scene>,
        log: &ViolationLog,
    ) -> TransformationResult {
        let violations = log.summary();
        let story = assemble_story(&scenes);

        let metadata = TransformationMetadata {
            run_id: RunId::new(),
            generated_at: Utc::now(),
            source_story: self.settings.source_story_name.clone(),
            target_world: self.settings.target_world_name.clone(),
            total_scenes: scenes.len(),
            scenes_with_violations: violations.scenes_with_violations,
            total_violations: violations.total_violations,
            failed_attempts: violations.failed_attempts,
            degraded_scenes: scenes.iter().filter(|s| !s.clean).count(),
            violation_types: violations.violation_types.clone(),
            success_rate_first_try: first_try_success_rate(
                scenes.len(),
                violations.scenes_with_violations,
            ),
            model_used: self.llm.model().to_string(),
            total_tokens_estimated: self.llm.total_tokens(),
            estimated_cost_usd: self.llm.estimate_cost(),
        };

        TransformationResult {
            essence,
            rulebook,
            scenes,
            story,
            violations,
            metadata,
        }
    }

    /// Run all three stages
    pub async fn transform(
        &self,
        story: &str,
        target_world: &str,
    ) -> Result<TransformationResult, TransformError> {
        let essence = self.extract_essence(story).await?;
        let rulebook = self.build_rulebook(&essence, target_world).await?;

        let mut log = ViolationLog::new();
        let scenes = self.generate_story(&essence, &rulebook, &mut log).await?;
        if log.is_empty() {
            tracing::info!("Every scene passed validation on the first attempt");
        } else {
            tracing::info!(
                failed_attempts = log.len(),
                "Story generated with corrections"
            );
        }

        Ok(self.finalize(essence, rulebook, scenes, &log))
    }
}
