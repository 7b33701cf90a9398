//! Constraint violations found in generated text
//!
//! # Architectural Note
//!
//! Violations carry serde derives because the violation log is written out
//! verbatim as a run artifact; the JSON shape is the artifact contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The rule family a violation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationKind {
    /// An original character name leaked into the new world
    #[serde(rename = "character_name_violation")]
    CharacterName,
    /// A term the rulebook forbids
    #[serde(rename = "forbidden_element")]
    ForbiddenElement,
    /// Supernatural or mystical language that breaks the world's physics
    #[serde(rename = "world_physics_violation")]
    WorldPhysics,
    /// Text not grounded in the context a constraint demands
    #[serde(rename = "context_violation")]
    MissingContext,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CharacterName => "character_name_violation",
            Self::ForbiddenElement => "forbidden_element",
            Self::WorldPhysics => "world_physics_violation",
            Self::MissingContext => "context_violation",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A single broken rule in one generated attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub severity: Severity,
    pub detail: String,
    pub suggestion: Option<String>,
}

impl Violation {
    pub fn new(kind: ViolationKind, severity: Severity, detail: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            detail: detail.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// One-line feedback for a corrective prompt
    pub fn feedback_line(&self) -> String {
        format!(
            "- {}. {}",
            self.detail,
            self.suggestion.as_deref().unwrap_or("")
        )
    }
}
