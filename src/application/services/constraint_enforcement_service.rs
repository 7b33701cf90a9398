//! Constraint Enforcement Service
//!
//! LLMs don't reliably follow every rule written into a prompt, so each
//! generated scene is checked after the fact. When the validator finds
//! violations, the scene is regenerated with explicit feedback until it
//! comes back clean or the retry budget runs out. Running out of budget is
//! not an error: the last attempt is accepted and the violations stay in
//! the log for the run summary.

use std::sync::Arc;

use crate::application::ports::outbound::{FinishReason, LlmError, LlmPort, LlmRequest};
use crate::application::services::llm::prompt_builder::build_correction_prompt;
use crate::domain::entities::Rulebook;
use crate::domain::services::{ConstraintValidator, KeywordValidator};
use crate::domain::value_objects::ViolationLog;

/// Sampling temperature and retry budget for one scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnforcementPolicy {
    pub temperature: f32,
    /// Corrective regenerations allowed after the first attempt
    pub max_retries: u32,
}

impl Default for EnforcementPolicy {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_retries: 2,
        }
    }
}

/// Outcome of an enforced generation
#[derive(Debug, Clone, PartialEq)]
pub struct EnforcedGeneration {
    pub text: String,
    /// Completion calls made, `max_retries + 1` when the budget ran out
    pub attempts: u32,
    /// Whether the accepted text passed validation
    pub clean: bool,
    /// Whether the accepted text was cut off at the token limit
    pub truncated: bool,
}

/// Runs the generate / validate / regenerate loop for a scene
pub struct ConstraintEnforcementService<L: LlmPort, V: ConstraintValidator = KeywordValidator> {
    llm: Arc<L>,
    validator: V,
}

impl<L: LlmPort, V: ConstraintValidator> ConstraintEnforcementService<L, V> {
    pub fn with_validator(llm: Arc<L>, validator: V) -> Self {
        Self { llm, validator }
    }

    /// Generate text for `scene_number`, regenerating while it breaks the rulebook
    ///
    /// Every failed attempt is appended to `log`. A corrective prompt is
    /// always the base prompt plus feedback on the latest attempt, so
    /// corrections don't pile up across retries. Only completion-service
    /// failures are returned as errors.
    pub async fn generate_with_enforcement(
        &self,
        rulebook: &Rulebook,
        log: &mut ViolationLog,
        base_prompt: &str,
        scene_number: usize,
        policy: EnforcementPolicy,
    ) -> Result<EnforcedGeneration, LlmError> {
        let mut prompt = base_prompt.to_string();
        let mut last_text = String::new();
        let mut last_truncated = false;

        for attempt in 0..=policy.max_retries {
            let request = LlmRequest::new(prompt.as_str()).with_temperature(policy.temperature);
            let response = self.llm.generate(request).await?;
            let truncated = response.finish_reason == FinishReason::Length;
            if truncated {
                tracing::warn!(
                    scene = scene_number,
                    attempt = attempt + 1,
                    "Completion truncated at max tokens"
                );
            }
            let text = response.content;

            let violations = self.validator.check(&text, rulebook);
            if violations.is_empty() {
                tracing::debug!(
                    scene = scene_number,
                    attempt = attempt + 1,
                    "Scene passed validation"
                );
                return Ok(EnforcedGeneration {
                    text,
                    attempts: attempt + 1,
                    clean: true,
                    truncated,
                });
            }

            tracing::warn!(
                scene = scene_number,
                attempt = attempt + 1,
                violations = violations.len(),
                "Scene failed validation"
            );
            for violation in &violations {
                tracing::debug!(scene = scene_number, kind = %violation.kind, "{}", violation.detail);
            }

            if attempt < policy.max_retries {
                prompt = build_correction_prompt(base_prompt, &violations);
            }
            log.record(scene_number, attempt + 1, violations, &text);
            last_text = text;
            last_truncated = truncated;
        }

        tracing::warn!(
            scene = scene_number,
            max_retries = policy.max_retries,
            "Retry budget exhausted, keeping last attempt"
        );
        Ok(EnforcedGeneration {
            text: last_text,
            attempts: policy.max_retries + 1,
            clean: false,
            truncated: last_truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::ScriptedLlm;
    use crate::domain::entities::CharacterMapping;
    use crate::domain::value_objects::ViolationKind;

    fn enforcer(llm: Arc<ScriptedLlm>) -> ConstraintEnforcementService<ScriptedLlm> {
        ConstraintEnforcementService::with_validator(llm, KeywordValidator::new())
    }

    const CLEAN: &str = "Kade-7 pushed the patch to the network before dawn.";
    const DIRTY: &str = "Kade-7 reached for the old magic.";

    fn rulebook() -> Rulebook {
        Rulebook::new()
            .with_mapping(CharacterMapping::new("Rama", "Kade-7"))
            .with_forbidden("magic")
    }

    fn policy(max_retries: u32) -> EnforcementPolicy {
        EnforcementPolicy {
            temperature: 0.7,
            max_retries,
        }
    }

    #[tokio::test]
    async fn test_clean_first_attempt() {
        let llm = Arc::new(ScriptedLlm::repeating(CLEAN));
        let service = enforcer(llm.clone());
        let mut log = ViolationLog::new();

        let result = service
            .generate_with_enforcement(&rulebook(), &mut log, "BASE", 1, policy(2))
            .await
            .unwrap();

        assert_eq!(result.text, CLEAN);
        assert_eq!(result.attempts, 1);
        assert!(result.clean);
        assert!(log.is_empty());
        assert_eq!(llm.call_count(), 1);
        assert_eq!(llm.requests()[0].temperature, Some(0.7));
    }

    #[tokio::test]
    async fn test_persistent_violation_exhausts_budget() {
        let llm = Arc::new(ScriptedLlm::repeating(DIRTY));
        let service = enforcer(llm.clone());
        let mut log = ViolationLog::new();

        let result = service
            .generate_with_enforcement(&rulebook(), &mut log, "BASE", 4, policy(2))
            .await
            .unwrap();

        assert_eq!(llm.call_count(), 3);
        assert_eq!(result.attempts, 3);
        assert_eq!(result.text, DIRTY);
        assert!(!result.clean);

        assert_eq!(log.len(), 3);
        let attempts: Vec<u32> = log.entries().iter().map(|e| e.attempt).collect();
        assert_eq!(attempts, vec![1, 2, 3]);
        assert!(log.entries().iter().all(|e| e.scene == 4));
        assert!(log.entries().iter().all(|e| e.violations[0].kind == ViolationKind::ForbiddenElement));
    }

    #[tokio::test]
    async fn test_recovers_after_correction() {
        let llm = Arc::new(ScriptedLlm::with_replies([DIRTY, CLEAN]));
        let service = enforcer(llm.clone());
        let mut log = ViolationLog::new();

        let result = service
            .generate_with_enforcement(&rulebook(), &mut log, "BASE", 2, policy(2))
            .await
            .unwrap();

        assert_eq!(result.attempts, 2);
        assert!(result.clean);
        assert_eq!(result.text, CLEAN);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].attempt, 1);

        let prompts = llm.prompts();
        assert_eq!(prompts[0], "BASE");
        assert!(prompts[1].starts_with("BASE\n\nCRITICAL CORRECTIONS NEEDED:"));
        assert!(prompts[1].contains("Contains forbidden term: 'magic'"));
    }

    #[tokio::test]
    async fn test_corrections_do_not_compound_across_retries() {
        let llm = Arc::new(ScriptedLlm::repeating(DIRTY));
        let service = enforcer(llm.clone());
        let mut log = ViolationLog::new();

        service
            .generate_with_enforcement(&rulebook(), &mut log, "BASE", 1, policy(3))
            .await
            .unwrap();

        let lengths: Vec<usize> = llm.prompts().iter().map(String::len).collect();
        assert_eq!(lengths.len(), 4);
        assert!(lengths[1] > lengths[0]);
        assert_eq!(lengths[1], lengths[2]);
        assert_eq!(lengths[2], lengths[3]);
        assert_eq!(
            llm.prompts()[3].matches("CRITICAL CORRECTIONS NEEDED").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_zero_retries_makes_one_call() {
        let llm = Arc::new(ScriptedLlm::repeating(DIRTY));
        let service = enforcer(llm.clone());
        let mut log = ViolationLog::new();

        let result = service
            .generate_with_enforcement(&rulebook(), &mut log, "BASE", 1, policy(0))
            .await
            .unwrap();

        assert_eq!(llm.call_count(), 1);
        assert_eq!(result.attempts, 1);
        assert!(!result.clean);
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_service_failure_is_returned() {
        let llm = Arc::new(ScriptedLlm::with_replies(Vec::<String>::new()));
        let service = enforcer(llm);
        let mut log = ViolationLog::new();

        let result = service
            .generate_with_enforcement(&rulebook(), &mut log, "BASE", 1, policy(2))
            .await;

        assert!(matches!(result, Err(LlmError::RequestFailed(_))));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_truncated_completion_is_flagged() {
        let llm = Arc::new(ScriptedLlm::repeating(CLEAN).finishing_with(FinishReason::Length));
        let service = enforcer(llm.clone());
        let mut log = ViolationLog::new();

        let result = service
            .generate_with_enforcement(&rulebook(), &mut log, "BASE", 1, policy(2))
            .await
            .unwrap();

        assert!(result.clean);
        assert!(result.truncated);
        assert_eq!(result.text, CLEAN);
    }

    #[tokio::test]
    async fn test_complete_generation_is_not_flagged() {
        let llm = Arc::new(ScriptedLlm::repeating(DIRTY));
        let service = enforcer(llm);
        let mut log = ViolationLog::new();

        let result = service
            .generate_with_enforcement(&rulebook(), &mut log, "BASE", 1, policy(1))
            .await
            .unwrap();

        assert!(!result.clean);
        assert!(!result.truncated);
    }
}
