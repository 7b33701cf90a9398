//! Prompt construction for LLM requests

pub mod prompt_builder;
