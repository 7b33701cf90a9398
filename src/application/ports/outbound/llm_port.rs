//! LLM port - The completion service the transformation pipeline talks to

use async_trait::async_trait;

/// A single-prompt completion request, the shape every pipeline stage uses
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Sent as the only user message
    pub prompt: String,
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Ask the backend for a syntactically valid JSON object
    pub json_response: bool,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            json_response: false,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_json_response(mut self) -> Self {
        self.json_response = true;
        self
    }
}

/// Response from the LLM
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The generated text content
    pub content: String,
    /// Finish reason
    pub finish_reason: FinishReason,
    /// Token usage
    pub usage: Option<TokenUsage>,
}

/// Reason the generation finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Unknown,
}

/// Token usage information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("LLM client not configured: {0}")]
    NotConfigured(String),
}

/// Text-completion backend
///
/// Implementations keep a running total of tokens consumed across every
/// call made through them.
#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Model identifier reported in run metadata
    fn model(&self) -> &str;

    /// Cumulative tokens consumed so far
    fn total_tokens(&self) -> u64;

    /// Estimated spend in USD for the tokens consumed so far
    fn estimate_cost(&self) -> f64 {
        0.0
    }
}
