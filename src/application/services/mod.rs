//! Application services - Use case implementations
//!
//! Services are generic over the completion port so they can run against
//! any OpenAI-compatible provider, or a scripted double in tests.

pub mod constraint_enforcement_service;
pub mod llm;
pub mod story_transformer_service;

#[cfg(test)]
mod test_support;

pub use story_transformer_service::{PipelineStage, StoryTransformerService, TransformerSettings};
