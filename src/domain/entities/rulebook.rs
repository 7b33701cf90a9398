//! Rulebook entity - How a story's essence maps into a target world

use std::collections::BTreeMap;

use super::PlotBeat;

/// All the rules for carrying a story into a new world
///
/// Built once per run and then only read: by the prompt builder for every
/// scene and by the constraint validator for every generated attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rulebook {
    /// Named world attributes (time_period, location, technology_level, ...)
    pub world_setting: BTreeMap<String, String>,
    /// Original names are unique within this list
    pub character_mappings: Vec<CharacterMapping>,
    /// Beat name -> how that beat plays out in the target world
    pub plot_translations: BTreeMap<String, String>,
    /// Free-text hard rules
    pub constraints: Vec<String>,
    /// Terms that must never appear in generated text
    pub forbidden_elements: Vec<String>,
}

impl Rulebook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.world_setting.insert(key.into(), value.into());
        self
    }

    pub fn with_mapping(mut self, mapping: CharacterMapping) -> Self {
        self.character_mappings.push(mapping);
        self
    }

    pub fn with_translation(mut self, beat_name: impl Into<String>, text: impl Into<String>) -> Self {
        self.plot_translations.insert(beat_name.into(), text.into());
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn with_forbidden(mut self, term: impl Into<String>) -> Self {
        self.forbidden_elements.push(term.into());
        self
    }

    /// The target-world version of a beat, or its abstract description when
    /// the rulebook has no translation for it
    pub fn translation_for<'a>(&'a self, beat: &'a PlotBeat) -> &'a str {
        self.plot_translations
            .get(&beat.beat_name)
            .map(String::as_str)
            .unwrap_or(&beat.description)
    }

    /// Beat names of `beats` with no entry in `plot_translations`
    pub fn untranslated_beats<'a>(&self, beats: &'a [PlotBeat]) -> Vec<&'a str> {
        beats
            .iter()
            .filter(|b| !self.plot_translations.contains_key(&b.beat_name))
            .map(|b| b.beat_name.as_str())
            .collect()
    }
}

/// How a character from the source story becomes a character in the new world
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterMapping {
    pub original: String,
    pub new_world: String,
    /// Role in the new world
    pub role: String,
    pub trait_preserved: String,
}

impl CharacterMapping {
    pub fn new(original: impl Into<String>, new_world: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            new_world: new_world.into(),
            role: String::new(),
            trait_preserved: String::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_trait(mut self, trait_preserved: impl Into<String>) -> Self {
        self.trait_preserved = trait_preserved.into();
        self
    }
}
