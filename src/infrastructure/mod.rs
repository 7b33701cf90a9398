//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Config: Application configuration
//! - OpenAI-compatible client: the completion service behind `LlmPort`
//! - Export: Writing run artifacts to disk

pub mod config;
pub mod export;
pub mod openai_compat;
