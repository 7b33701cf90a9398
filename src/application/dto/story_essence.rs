//! Story essence DTOs - The JSON shape the extraction stage asks the LLM for

use serde::{Deserialize, Serialize};

use super::ParseError;
use crate::domain::entities::{CharacterProfile, PlotBeat, StoryEssence};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryEssenceDto {
    pub themes: Vec<String>,
    pub characters: Vec<CharacterProfileDto>,
    pub plot_beats: Vec<PlotBeatDto>,
    pub emotional_arc: String,
    pub conflict_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterProfileDto {
    pub name: String,
    pub archetype: String,
    pub core_trait: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotBeatDto {
    pub beat_name: String,
    pub description: String,
    pub emotion: String,
    pub act: u8,
}

impl TryFrom<StoryEssenceDto> for StoryEssence {
    type Error = ParseError;

    fn try_from(dto: StoryEssenceDto) -> Result<Self, Self::Error> {
        if dto.plot_beats.is_empty() {
            return Err(ParseError::Invalid(
                "story essence has no plot_beats".to_string(),
            ));
        }

        let mut essence = dto
            .themes
            .into_iter()
            .fold(StoryEssence::new(dto.emotional_arc, dto.conflict_type), |essence, theme| {
                essence.with_theme(theme)
            });

        for c in dto.characters {
            essence = essence.with_character(CharacterProfile::new(
                c.name,
                c.archetype,
                c.core_trait,
                c.role,
            ));
        }

        for beat in dto.plot_beats {
            if beat.beat_name.trim().is_empty() {
                return Err(ParseError::Invalid(
                    "plot beat with empty beat_name".to_string(),
                ));
            }
            if !(1..=3).contains(&beat.act) {
                return Err(ParseError::Invalid(format!(
                    "plot beat '{}' has act {} (expected 1, 2, or 3)",
                    beat.beat_name, beat.act
                )));
            }
            essence = essence.with_plot_beat(
                PlotBeat::new(beat.beat_name, beat.description)
                    .with_emotion(beat.emotion)
                    .in_act(beat.act),
            );
        }

        Ok(essence)
    }
}

impl From<&StoryEssence> for StoryEssenceDto {
    fn from(essence: &StoryEssence) -> Self {
        Self {
            themes: essence.themes.clone(),
            characters: essence
                .characters
                .iter()
                .map(|c| CharacterProfileDto {
                    name: c.name.clone(),
                    archetype: c.archetype.clone(),
                    core_trait: c.core_trait.clone(),
                    role: c.role.clone(),
                })
                .collect(),
            plot_beats: essence
                .plot_beats
                .iter()
                .map(|b| PlotBeatDto {
                    beat_name: b.beat_name.clone(),
                    description: b.description.clone(),
                    emotion: b.emotion.clone(),
                    act: b.act,
                })
                .collect(),
            emotional_arc: essence.emotional_arc.clone(),
            conflict_type: essence.conflict_type.clone(),
        }
    }
}
