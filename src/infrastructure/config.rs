//! Application configuration
//!
//! Values come from an optional `transformer.toml` in the working directory,
//! overridden by environment variables (`.env` is loaded first by `main`).
//! Keys are the lowercased environment variable names.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use config::{Config, ConfigError, Environment, File};
use serde::de::DeserializeOwned;

use crate::application::services::TransformerSettings;

/// Target world used when none is configured
pub const DEFAULT_TARGET_WORLD: &str = "Cyberpunk Silicon Valley 2045, during the race to develop \
Artificial General Intelligence (AGI). Tech corporations have more power than governments. \
Corporate espionage is rampant. The ethics of AI development are hotly contested.";

pub const DEFAULT_TARGET_WORLD_NAME: &str = "Cyberpunk 2045";
pub const DEFAULT_STORY_FILE: &str = "data/ramayana_story.txt";
pub const DEFAULT_STORY_NAME: &str = "Ramayana";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// OpenAI-compatible completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Groq,
    OpenAi,
    Ollama,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Environment variable holding the API key, if the provider needs one
    pub fn credential_var(&self) -> Option<&'static str> {
        match self {
            Self::Groq => Some("GROQ_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Ollama => None,
        }
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => bail!("LLM_PROVIDER must be groq, openai, or ollama (got '{}')", other),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Groq => "groq",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        })
    }
}

/// What to transform, and into what
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub story_file: PathBuf,
    pub story_name: String,
    pub target_world: String,
    pub target_world_name: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: LlmProvider,
    /// API key for the chosen provider, if one is set
    pub api_key: Option<String>,
    pub model: String,
    /// OpenAI-compatible base URL, without the `/chat/completions` suffix
    pub base_url: String,
    pub timeout_secs: u64,
    /// USD per million tokens, used for the cost estimate
    pub cost_per_million_tokens: f64,

    pub dna_temperature: f32,
    pub rulebook_temperature: f32,
    pub story_temperature: f32,
    pub max_retries: u32,

    pub output_dir: PathBuf,
    pub inputs: RunInputs,
}

impl AppConfig {
    /// Load configuration from `transformer.toml` and the environment
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("transformer").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()
            .context("Failed to read configuration")?;
        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &Config) -> Result<Self> {
        let provider: LlmProvider = get_or(settings, "llm_provider", "groq".to_string())?.parse()?;

        let api_key = match provider.credential_var() {
            Some(var) => get_opt::<String>(settings, &var.to_lowercase())?
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            None => None,
        };

        let config = Self {
            provider,
            api_key,
            model: get_or(settings, "primary_model", DEFAULT_MODEL.to_string())?,
            base_url: get_or(
                settings,
                "llm_base_url",
                provider.default_base_url().to_string(),
            )?,
            timeout_secs: get_or(settings, "llm_timeout_secs", 120)?,
            cost_per_million_tokens: get_or(settings, "cost_per_million_tokens", 0.0)?,

            dna_temperature: get_or(settings, "dna_temperature", 0.3)?,
            rulebook_temperature: get_or(settings, "rulebook_temperature", 0.4)?,
            story_temperature: get_or(settings, "story_temperature", 0.7)?,
            max_retries: get_or(settings, "max_retries", 2)?,

            output_dir: PathBuf::from(get_or(settings, "output_dir", "outputs".to_string())?),
            inputs: RunInputs {
                story_file: PathBuf::from(get_or(
                    settings,
                    "story_file",
                    DEFAULT_STORY_FILE.to_string(),
                )?),
                story_name: get_or(settings, "story_name", DEFAULT_STORY_NAME.to_string())?,
                target_world: get_or(settings, "target_world", DEFAULT_TARGET_WORLD.to_string())?,
                target_world_name: get_or(
                    settings,
                    "target_world_name",
                    DEFAULT_TARGET_WORLD_NAME.to_string(),
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (var, value) in [
            ("DNA_TEMPERATURE", self.dna_temperature),
            ("RULEBOOK_TEMPERATURE", self.rulebook_temperature),
            ("STORY_TEMPERATURE", self.story_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                bail!("{} must be between 0.0 and 2.0 (got {})", var, value);
            }
        }
        if self.cost_per_million_tokens < 0.0 {
            bail!("COST_PER_MILLION_TOKENS must not be negative");
        }
        Ok(())
    }

    /// Pipeline settings for the configured run
    pub fn transformer_settings(&self) -> TransformerSettings {
        TransformerSettings {
            dna_temperature: self.dna_temperature,
            rulebook_temperature: self.rulebook_temperature,
            story_temperature: self.story_temperature,
            max_retries: self.max_retries,
            source_story_name: self.inputs.story_name.clone(),
            target_world_name: self.inputs.target_world_name.clone(),
        }
    }
}

fn get_opt<T: DeserializeOwned>(settings: &Config, key: &str) -> Result<Option<T>> {
    match settings.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("{} is invalid", key.to_uppercase())),
    }
}

fn get_or<T: DeserializeOwned>(settings: &Config, key: &str, default: T) -> Result<T> {
    Ok(get_opt(settings, key)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(overrides: &[(&str, &str)]) -> Config {
        overrides
            .iter()
            .fold(Config::builder(), |builder, (key, value)| {
                builder.set_override(*key, *value).unwrap()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_settings(&settings(&[])).unwrap();

        assert_eq!(config.provider, LlmProvider::Groq);
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.dna_temperature, 0.3);
        assert_eq!(config.rulebook_temperature, 0.4);
        assert_eq!(config.story_temperature, 0.7);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
        assert_eq!(config.inputs.story_name, "Ramayana");
        assert_eq!(config.inputs.target_world_name, "Cyberpunk 2045");
    }

    #[test]
    fn test_provider_selects_credential_and_base_url() {
        let config = AppConfig::from_settings(&settings(&[
            ("llm_provider", "OpenAI"),
            ("openai_api_key", "sk-test"),
            ("groq_api_key", "gsk-ignored"),
        ]))
        .unwrap();

        assert_eq!(config.provider, LlmProvider::OpenAi);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_ollama_needs_no_credential() {
        let config = AppConfig::from_settings(&settings(&[
            ("llm_provider", "ollama"),
            ("llm_base_url", "http://gpu-box:11434/v1"),
        ]))
        .unwrap();

        assert_eq!(config.provider.credential_var(), None);
        assert_eq!(config.base_url, "http://gpu-box:11434/v1");
    }

    #[test]
    fn test_blank_credential_is_treated_as_missing() {
        let config = AppConfig::from_settings(&settings(&[("groq_api_key", "  ")])).unwrap();
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_numeric_overrides() {
        let config = AppConfig::from_settings(&settings(&[
            ("story_temperature", "1.1"),
            ("max_retries", "5"),
        ]))
        .unwrap();

        assert_eq!(config.story_temperature, 1.1);
        assert_eq!(config.max_retries, 5);

        let transformer = config.transformer_settings();
        assert_eq!(transformer.max_retries, 5);
        assert_eq!(transformer.source_story_name, "Ramayana");
    }

    #[test]
    fn test_out_of_range_temperature_names_variable() {
        let err = AppConfig::from_settings(&settings(&[("dna_temperature", "3.5")])).unwrap_err();
        assert!(err.to_string().contains("DNA_TEMPERATURE"));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = AppConfig::from_settings(&settings(&[("llm_provider", "bard")])).unwrap_err();
        assert!(err.to_string().contains("LLM_PROVIDER"));
    }

    #[test]
    fn test_unparseable_number_names_variable() {
        let err = AppConfig::from_settings(&settings(&[("max_retries", "lots")])).unwrap_err();
        assert!(err.to_string().contains("MAX_RETRIES"));
    }
}
