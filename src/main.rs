//! Story Transformer - Retell a story in a different world
//!
//! Runs a three-stage pipeline against an OpenAI-compatible LLM:
//! - Extracts the story's portable essence (themes, characters, plot beats)
//! - Builds a rulebook mapping that essence onto the target world
//! - Writes one scene per plot beat, regenerating scenes that break the rules
//!
//! Every stage's output is saved to the output directory.

mod application;
mod domain;
mod infrastructure;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::services::{PipelineStage, StoryTransformerService};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::export::ArtifactWriter;
use crate::infrastructure::openai_compat::OpenAiCompatibleClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "story_transformer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Story Transformer");

    // Load configuration
    let mut config = AppConfig::load()?;
    if let Some(story_file) = std::env::args().nth(1) {
        config.inputs.story_file = story_file.into();
    }
    tracing::info!("Configuration loaded");
    tracing::info!("  Provider: {} ({})", config.provider, config.base_url);
    tracing::info!("  Model: {}", config.model);
    tracing::info!("  Story: {}", config.inputs.story_name);
    tracing::info!("  Target world: {}", config.inputs.target_world_name);

    let llm = match OpenAiCompatibleClient::from_config(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!("Error initializing LLM client: {}", e);
            return Err(e).context("LLM client initialization failed");
        }
    };

    let story = tokio::fs::read_to_string(&config.inputs.story_file)
        .await
        .with_context(|| format!("{} not found", config.inputs.story_file.display()))?;
    tracing::info!(chars = story.len(), "Loaded original story");

    let transformer = StoryTransformerService::new(llm, config.transformer_settings());

    let result = match transformer
        .transform(&story, &config.inputs.target_world)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(stage = %e.stage(), "{}", e);
            return Err(e.into());
        }
    };

    let writer = ArtifactWriter::new(&config.output_dir);
    let paths = writer
        .save(&result)
        .await
        .with_context(|| format!("Error in {}", PipelineStage::SavingOutputs))?;

    let metadata = &result.metadata;
    println!();
    println!("Transformation complete");
    println!("  Outputs saved to {}/", writer.output_dir().display());
    for path in paths.all() {
        println!("    {}", path.display());
    }
    println!(
        "  Scenes: {} ({} words)",
        metadata.total_scenes,
        result.word_count()
    );
    println!(
        "  Violations caught: {} across {} scenes ({} degraded)",
        metadata.total_violations, metadata.scenes_with_violations, metadata.degraded_scenes
    );
    println!("  First-try success rate: {}", metadata.success_rate_first_try);
    println!("  Tokens used: {}", metadata.total_tokens_estimated);
    println!("  Estimated cost: ${:.4}", metadata.estimated_cost_usd);

    Ok(())
}
