//! Rulebook DTOs - The JSON shape the rule-building stage asks the LLM for

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::ParseError;
use crate::domain::entities::{CharacterMapping, Rulebook};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulebookDto {
    pub world_setting: BTreeMap<String, String>,
    pub character_mappings: Vec<CharacterMappingDto>,
    pub plot_translations: BTreeMap<String, String>,
    pub constraints: Vec<String>,
    pub forbidden_elements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterMappingDto {
    pub original: String,
    pub new_world: String,
    pub role: String,
    pub trait_preserved: String,
}

impl TryFrom<RulebookDto> for Rulebook {
    type Error = ParseError;

    fn try_from(dto: RulebookDto) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        for mapping in &dto.character_mappings {
            if mapping.original.trim().is_empty() {
                return Err(ParseError::Invalid(
                    "character mapping with empty original name".to_string(),
                ));
            }
            if !seen.insert(mapping.original.as_str()) {
                return Err(ParseError::Invalid(format!(
                    "duplicate character mapping for '{}'",
                    mapping.original
                )));
            }
        }

        let mut rulebook = Rulebook::new();
        for (key, value) in dto.world_setting {
            rulebook = rulebook.with_setting(key, value);
        }
        for m in dto.character_mappings {
            rulebook = rulebook.with_mapping(
                CharacterMapping::new(m.original, m.new_world)
                    .with_role(m.role)
                    .with_trait(m.trait_preserved),
            );
        }
        for (beat_name, text) in dto.plot_translations {
            rulebook = rulebook.with_translation(beat_name, text);
        }
        for constraint in dto.constraints {
            rulebook = rulebook.with_constraint(constraint);
        }
        // An empty term would match every text
        for term in dto.forbidden_elements {
            let term = term.trim();
            if !term.is_empty() {
                rulebook = rulebook.with_forbidden(term);
            }
        }

        Ok(rulebook)
    }
}

impl From<&Rulebook> for RulebookDto {
    fn from(rulebook: &Rulebook) -> Self {
        Self {
            world_setting: rulebook.world_setting.clone(),
            character_mappings: rulebook
                .character_mappings
                .iter()
                .map(|m| CharacterMappingDto {
                    original: m.original.clone(),
                    new_world: m.new_world.clone(),
                    role: m.role.clone(),
                    trait_preserved: m.trait_preserved.clone(),
                })
                .collect(),
            plot_translations: rulebook.plot_translations.clone(),
            constraints: rulebook.constraints.clone(),
            forbidden_elements: rulebook.forbidden_elements.clone(),
        }
    }
}
