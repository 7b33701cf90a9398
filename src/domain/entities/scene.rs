//! Scene entity - One accepted piece of generated story

/// Separator placed between scenes in the assembled story
pub const SCENE_SEPARATOR: &str = "\n\n---\n\n";

/// A scene accepted by the enforcement loop
///
/// Scenes are accepted whether or not they ended clean; `clean` records
/// which of the two happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// 1-based position in the story
    pub number: usize,
    /// The plot beat this scene realises
    pub beat_name: String,
    pub text: String,
    /// Completion calls spent on this scene
    pub attempts: u32,
    /// False when the retry budget ran out with violations remaining
    pub clean: bool,
}

impl Scene {
    pub fn new(number: usize, beat_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number,
            beat_name: beat_name.into(),
            text: text.into(),
            attempts: 1,
            clean: true,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn degraded(mut self) -> Self {
        self.clean = false;
        self
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Join accepted scenes into the final story text
pub fn assemble_story(scenes: &[Scene]) -> String {
    scenes
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(SCENE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_story_joins_with_separator() {
        let scenes = vec![
            Scene::new(1, "exile", "First."),
            Scene::new(2, "abduction", "Second.").with_attempts(2),
        ];

        assert_eq!(assemble_story(&scenes), "First.\n\n---\n\nSecond.");
        assert_eq!(assemble_story(&[]), "");
    }

    #[test]
    fn test_word_count() {
        let scene = Scene::new(1, "exile", "The  servers hummed\nall night.").degraded();
        assert_eq!(scene.word_count(), 5);
        assert!(!scene.clean);
    }
}
