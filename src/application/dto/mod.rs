//! Data Transfer Objects - For the LLM and artifact boundaries
//!
//! DTOs live in the application layer so the structured JSON exchanged with
//! the LLM is checked here, and the domain model stays free of parsing.

mod rulebook;
mod story_essence;
mod transformation;

use serde::de::DeserializeOwned;

pub use rulebook::RulebookDto;
pub use story_essence::StoryEssenceDto;
pub use transformation::{first_try_success_rate, TransformationMetadata, TransformationResult};

/// Errors raised while turning an LLM response into a domain object
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(String),
}

/// Deserialize the JSON object contained in an LLM response
///
/// Models in JSON mode usually return a bare object, but some wrap it in a
/// code fence or a sentence. The first complete object after the first `{`
/// wins; when that fails, the span up to the last `}` is tried instead.
pub fn parse_structured<T: DeserializeOwned>(content: &str) -> Result<T, ParseError> {
    let Some(start) = content.find('{') else {
        return Ok(serde_json::from_str(content.trim())?);
    };

    let mut objects = serde_json::Deserializer::from_str(&content[start..]).into_iter::<T>();
    match objects.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(first_error)) => match content.rfind('}') {
            Some(end) if end > start => serde_json::from_str(&content[start..=end])
                .map_err(|_| ParseError::from(first_error)),
            _ => Err(first_error.into()),
        },
        None => Ok(serde_json::from_str(content.trim())?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_rejects_non_json() {
        let err = parse_structured::<serde_json::Value>("I cannot help with that.").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_structured_extracts_embedded_object() {
        let value: serde_json::Value =
            parse_structured("Here you go: {\"a\": 1} Hope that helps!").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_parse_structured_ignores_braces_after_object() {
        let value: serde_json::Value =
            parse_structured("{\"a\": 1} see {notes} for details").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_parse_structured_reads_fenced_object() {
        let value: serde_json::Value =
            parse_structured("```json\n{\"themes\": [\"loyalty\"]}\n```").unwrap();
        assert_eq!(value["themes"][0], "loyalty");
    }

    #[test]
    fn test_parse_structured_reports_first_object_error() {
        let err = parse_structured::<serde_json::Value>("{\"a\": } trailing").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }
}
