//! Story essence - The portable core of a story that survives a change of world

/// The themes, cast, and plot skeleton extracted from a source story
#[derive(Debug, Clone, PartialEq)]
pub struct StoryEssence {
    /// Abstract, setting-independent themes (ordered by importance)
    pub themes: Vec<String>,
    pub characters: Vec<CharacterProfile>,
    /// Key story moments in narrative order
    pub plot_beats: Vec<PlotBeat>,
    /// Overall emotional journey in one sentence
    pub emotional_arc: String,
    /// e.g. "person vs person", "person vs self"
    pub conflict_type: String,
}

impl StoryEssence {
    pub fn new(emotional_arc: impl Into<String>, conflict_type: impl Into<String>) -> Self {
        Self {
            themes: Vec::new(),
            characters: Vec::new(),
            plot_beats: Vec::new(),
            emotional_arc: emotional_arc.into(),
            conflict_type: conflict_type.into(),
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.themes.push(theme.into());
        self
    }

    pub fn with_character(mut self, character: CharacterProfile) -> Self {
        self.characters.push(character);
        self
    }

    pub fn with_plot_beat(mut self, beat: PlotBeat) -> Self {
        self.plot_beats.push(beat);
        self
    }

    /// The theme every scene is asked to maintain
    pub fn primary_theme(&self) -> Option<&str> {
        self.themes.first().map(String::as_str)
    }
}

/// A character reduced to its archetypal function
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterProfile {
    pub name: String,
    /// Universal role (hero, antagonist, mentor, ...)
    pub archetype: String,
    /// One defining characteristic
    pub core_trait: String,
    /// Function in the story
    pub role: String,
}

impl CharacterProfile {
    pub fn new(
        name: impl Into<String>,
        archetype: impl Into<String>,
        core_trait: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            archetype: archetype.into(),
            core_trait: core_trait.into(),
            role: role.into(),
        }
    }
}

/// A single important moment in the story
#[derive(Debug, Clone, PartialEq)]
pub struct PlotBeat {
    /// Short name, also the key into the rulebook's plot translations
    pub beat_name: String,
    /// What happens, described without setting-specific detail
    pub description: String,
    pub emotion: String,
    /// Act number (1, 2, or 3)
    pub act: u8,
}

impl PlotBeat {
    pub fn new(beat_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            beat_name: beat_name.into(),
            description: description.into(),
            emotion: "intense".to_string(),
            act: 1,
        }
    }

    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = emotion.into();
        self
    }

    pub fn in_act(mut self, act: u8) -> Self {
        self.act = act;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_theme_is_first_theme() {
        let essence = StoryEssence::new("hope to grief", "person vs person")
            .with_theme("duty vs desire")
            .with_theme("loyalty");
        assert_eq!(essence.primary_theme(), Some("duty vs desire"));

        let empty = StoryEssence::new("arc", "conflict");
        assert_eq!(empty.primary_theme(), None);
    }

    #[test]
    fn test_plot_beat_defaults() {
        let beat = PlotBeat::new("exile", "The hero is cast out");
        assert_eq!(beat.act, 1);
        assert_eq!(beat.emotion, "intense");

        let beat = beat.with_emotion("sorrow").in_act(2);
        assert_eq!(beat.act, 2);
        assert_eq!(beat.emotion, "sorrow");
    }
}
