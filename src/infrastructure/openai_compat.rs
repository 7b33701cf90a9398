//! OpenAI-compatible chat completions client
//!
//! Groq, OpenAI and Ollama all serve the `/chat/completions` protocol, so a
//! single client covers every provider; only the base URL and key differ.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::outbound::{
    FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, TokenUsage,
};
use crate::infrastructure::config::AppConfig;

/// Client for any OpenAI-compatible chat completions endpoint
pub struct OpenAiCompatibleClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    cost_per_million_tokens: f64,
    total_tokens: AtomicU64,
}

impl OpenAiCompatibleClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            cost_per_million_tokens: 0.0,
            total_tokens: AtomicU64::new(0),
        }
    }

    /// Build a client for the configured provider
    ///
    /// Fails when the provider needs an API key and none is set.
    pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
        if let Some(var) = config.provider.credential_var() {
            if config.api_key.is_none() {
                return Err(LlmError::NotConfigured(format!(
                    "{} is not set; please check your {} in .env file",
                    var, var
                )));
            }
        }

        Ok(Self::new(
            &config.base_url,
            &config.model,
            config.api_key.clone(),
            config.timeout_secs,
        )
        .with_cost_rate(config.cost_per_million_tokens))
    }

    pub fn with_cost_rate(mut self, cost_per_million_tokens: f64) -> Self {
        self.cost_per_million_tokens = cost_per_million_tokens;
        self
    }

    fn build_request(&self, request: &LlmRequest) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: self.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: Some(request.prompt.clone()),
            }],
            temperature: request.temperature,
            response_format: request.json_response.then(|| ResponseFormat {
                r#type: "json_object".to_string(),
            }),
        }
    }
}

#[async_trait]
impl LlmPort for OpenAiCompatibleClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let api_request = self.build_request(&request);

        let mut http_request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&api_request);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .map_err(|e| LlmError::RequestFailed(e.to_string()))?;
            return Err(LlmError::RequestFailed(format!("{}: {}", status, error_text)));
        }

        let api_response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let response = convert_response(api_response)?;
        if let Some(usage) = response.usage {
            self.total_tokens
                .fetch_add(u64::from(usage.total_tokens), Ordering::Relaxed);
            tracing::debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion received"
            );
        }
        Ok(response)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn total_tokens(&self) -> u64 {
        self.total_tokens.load(Ordering::Relaxed)
    }

    fn estimate_cost(&self) -> f64 {
        self.total_tokens() as f64 / 1_000_000.0 * self.cost_per_million_tokens
    }
}

fn convert_response(response: OpenAIChatResponse) -> Result<LlmResponse, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No choices in LLM response".to_string()))?;

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("stop") => FinishReason::Stop,
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        _ => FinishReason::Unknown,
    };

    Ok(LlmResponse {
        content: choice.message.content.unwrap_or_default(),
        finish_reason,
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
