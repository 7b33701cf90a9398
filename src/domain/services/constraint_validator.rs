//! Constraint validation - Checks generated text against a rulebook
//!
//! Validation is plain substring matching. There is no word-boundary check,
//! so a forbidden term also matches inside longer words ("magic" inside
//! "magical", "ai" inside "said"). The tests below pin that behaviour.

use crate::domain::entities::Rulebook;
use crate::domain::value_objects::{Severity, Violation, ViolationKind};

/// Terms implying supernatural causation, flagged in any target world
pub const ANACHRONISM_TERMS: &[&str] = &[
    "divine",
    "gods",
    "supernatural",
    "mystical",
    "enchanted",
    "blessed",
    "cursed",
    "magical",
];

/// Words in a constraint that demand corporate/technology grounding
pub const GROUNDING_MARKERS: &[&str] = &["corporate", "tech"];

/// At least one of these must appear when a grounding constraint applies
pub const GROUNDING_KEYWORDS: &[&str] = &[
    "company",
    "corporation",
    "corp",
    "tech",
    "startup",
    "ai",
    "algorithm",
    "data",
    "software",
    "hardware",
    "code",
    "digital",
    "cyber",
    "network",
];

/// Something that can judge generated text against a rulebook
///
/// Implementations must be pure: the same text and rulebook always yield
/// the same ordered list of violations.
pub trait ConstraintValidator: Send + Sync {
    fn check(&self, text: &str, rulebook: &Rulebook) -> Vec<Violation>;
}

/// Keyword-based validator
///
/// Runs four checks in a fixed order (character names, forbidden elements,
/// world physics, context grounding) without short-circuiting.
#[derive(Debug, Clone)]
pub struct KeywordValidator {
    anachronisms: Vec<String>,
    grounding_markers: Vec<String>,
    grounding_keywords: Vec<String>,
}

impl Default for KeywordValidator {
    fn default() -> Self {
        Self {
            anachronisms: to_owned(ANACHRONISM_TERMS),
            grounding_markers: to_owned(GROUNDING_MARKERS),
            grounding_keywords: to_owned(GROUNDING_KEYWORDS),
        }
    }
}

impl KeywordValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Original names are matched case-sensitively
    fn check_character_names(&self, text: &str, rulebook: &Rulebook, out: &mut Vec<Violation>) {
        for mapping in &rulebook.character_mappings {
            if text.contains(&mapping.original) {
                out.push(
                    Violation::new(
                        ViolationKind::CharacterName,
                        Severity::High,
                        format!(
                            "Found '{}' - should be '{}'",
                            mapping.original, mapping.new_world
                        ),
                    )
                    .with_suggestion(format!("Use '{}' instead", mapping.new_world)),
                );
            }
        }
    }

    fn check_forbidden(&self, lowered: &str, rulebook: &Rulebook, out: &mut Vec<Violation>) {
        for forbidden in &rulebook.forbidden_elements {
            if lowered.contains(&forbidden.to_lowercase()) {
                out.push(
                    Violation::new(
                        ViolationKind::ForbiddenElement,
                        Severity::High,
                        format!("Contains forbidden term: '{}'", forbidden),
                    )
                    .with_suggestion(format!(
                        "Remove '{}' or replace with tech equivalent",
                        forbidden
                    )),
                );
            }
        }
    }

    fn check_world_physics(&self, lowered: &str, out: &mut Vec<Violation>) {
        for term in &self.anachronisms {
            if lowered.contains(&term.to_lowercase()) {
                out.push(
                    Violation::new(
                        ViolationKind::WorldPhysics,
                        Severity::Medium,
                        format!("Anachronism: '{}' doesn't fit tech world", term),
                    )
                    .with_suggestion("Use technology/science terminology"),
                );
            }
        }
    }

    fn check_context(&self, lowered: &str, rulebook: &Rulebook, out: &mut Vec<Violation>) {
        let grounded = self
            .grounding_keywords
            .iter()
            .any(|keyword| lowered.contains(keyword.as_str()));

        for constraint in &rulebook.constraints {
            let constraint = constraint.to_lowercase();
            let demands_grounding = self
                .grounding_markers
                .iter()
                .any(|marker| constraint.contains(marker.as_str()));

            if demands_grounding && !grounded {
                out.push(
                    Violation::new(
                        ViolationKind::MissingContext,
                        Severity::Low,
                        "Missing corporate/tech context",
                    )
                    .with_suggestion("Add tech elements to ground it in the target world"),
                );
            }
        }
    }
}

impl ConstraintValidator for KeywordValidator {
    fn check(&self, text: &str, rulebook: &Rulebook) -> Vec<Violation> {
        let lowered = text.to_lowercase();
        let mut violations = Vec::new();

        self.check_character_names(text, rulebook, &mut violations);
        self.check_forbidden(&lowered, rulebook, &mut violations);
        self.check_world_physics(&lowered, &mut violations);
        self.check_context(&lowered, rulebook, &mut violations);

        violations
    }
}

fn to_owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}
