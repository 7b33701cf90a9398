//! Test doubles for the completion service

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::outbound::{
    FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, TokenUsage,
};

/// Tokens reported for every scripted reply
pub const TOKENS_PER_CALL: u32 = 10;

/// LLM stub that replays scripted replies and records every request
///
/// Replies are served in order; once the script is exhausted the `repeat`
/// reply is served forever, or the call fails when there is none.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    finish_reason: FinishReason,
    requests: Mutex<Vec<LlmRequest>>,
    tokens: AtomicU64,
}

impl ScriptedLlm {
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            repeat: None,
            finish_reason: FinishReason::Stop,
            requests: Mutex::new(Vec::new()),
            tokens: AtomicU64::new(0),
        }
    }

    pub fn repeating(reply: impl Into<String>) -> Self {
        Self::with_replies(Vec::<String>::new()).then_repeat(reply)
    }

    pub fn then_repeat(mut self, reply: impl Into<String>) -> Self {
        self.repeat = Some(reply.into());
        self
    }

    /// Report every reply as finishing for `reason`
    pub fn finishing_with(mut self, reason: FinishReason) -> Self {
        self.finish_reason = reason;
        self
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// User prompt of every request, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmPort for ScriptedLlm {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.repeat.clone())
            .ok_or_else(|| LlmError::RequestFailed("script exhausted".to_string()))?;

        self.tokens
            .fetch_add(u64::from(TOKENS_PER_CALL), Ordering::Relaxed);

        Ok(LlmResponse {
            content: reply,
            finish_reason: self.finish_reason,
            usage: Some(TokenUsage {
                prompt_tokens: TOKENS_PER_CALL / 2,
                completion_tokens: TOKENS_PER_CALL / 2,
                total_tokens: TOKENS_PER_CALL,
            }),
        })
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn total_tokens(&self) -> u64 {
        self.tokens.load(Ordering::Relaxed)
    }
}
