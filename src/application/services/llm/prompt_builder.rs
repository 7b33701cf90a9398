//! Prompt building functions for the three transformation stages

use crate::domain::entities::{PlotBeat, Rulebook, Scene, StoryEssence};
use crate::domain::value_objects::Violation;

/// Context marker used before any scene has been accepted
pub const OPENING_SCENE_CONTEXT: &str = "This is the opening scene.";

/// Number of accepted scenes carried into the next scene's prompt
pub const CONTEXT_WINDOW_SCENES: usize = 2;

/// Everything the scene prompt is built from
#[derive(Debug, Clone, Copy)]
pub struct ScenePromptContext<'a> {
    pub scene_number: usize,
    pub beat: &'a PlotBeat,
    pub rulebook: &'a Rulebook,
    /// Output of [`build_context_window`]
    pub previous_context: &'a str,
    pub theme: &'a str,
    pub story_name: &'a str,
    pub target_world_name: &'a str,
}

/// Build the extraction prompt that pulls a portable essence out of a story
pub fn build_extraction_prompt(story: &str) -> String {
    format!(
        r#"Analyze this story and extract its core DNA - the portable essence that can travel to any world.

Story:
{story}

Extract the following in JSON format:

1. themes: 3-5 ABSTRACT, UNIVERSAL themes (not setting-specific)
   Example: "duty vs personal desire" NOT "ancient Indian values"

2. characters: Array of main characters with:
   - name: Character name
   - archetype: Universal role (hero, antagonist, mentor, etc.)
   - core_trait: ONE defining characteristic
   - role: Function in story

3. plot_beats: 5-7 key story moments with:
   - beat_name: Short name (e.g., "exile", "abduction")
   - description: What happens (abstract, no specific setting)
   - emotion: Primary emotion of this beat
   - act: Act number (1, 2, or 3)

4. emotional_arc: Overall emotional journey in one sentence

5. conflict_type: Core type of conflict (person vs person, person vs self, etc.)

CRITICAL: Be ABSTRACT. Focus on patterns that work in ANY setting.
Avoid culture-specific or setting-specific language.

Return ONLY valid JSON matching this structure."#
    )
}

/// Build the prompt that maps an essence onto a target world
pub fn build_rulebook_prompt(essence_json: &str, target_world: &str, themes: &[String]) -> String {
    format!(
        r#"Given this story DNA and target world, create a comprehensive transformation rulebook.

Story DNA:
{essence_json}

Target World: {target_world}

Create a transformation rulebook in JSON format:

1. world_setting: Dictionary with string values for keys:
   - time_period: When this takes place
   - location: Where this takes place
   - technology_level: What tech exists
   - power_structure: Who has power and how
   - society_type: Type of society

2. character_mappings: Array mapping each original character with:
   - original: Original character name
   - new_world: NEW name appropriate for target world
   - role: Their role in new world
   - trait_preserved: Core trait that carries over

3. plot_translations: Dictionary mapping each plot beat to new world equivalent
   Keys: beat names from DNA
   Values: How this translates to new world

4. constraints: Array of 5-7 HARD RULES that MUST be followed:
   - Rules about what can/cannot appear
   - Technology limitations
   - Character name usage
   - Setting requirements

5. forbidden_elements: Array of elements that CANNOT appear (e.g., "magic" in tech world)

IMPORTANT:
- Character mappings must be CREATIVE and world-appropriate
- Preserve core themes: {themes}
- Be specific with constraints - these will be validated
- Make the world feel coherent and realistic

Return ONLY valid JSON."#,
        themes = themes.join(", ")
    )
}

/// Context handed to the next scene: the last two accepted scenes, oldest first
pub fn build_context_window(accepted: &[Scene]) -> String {
    if accepted.is_empty() {
        return OPENING_SCENE_CONTEXT.to_string();
    }
    let start = accepted.len().saturating_sub(CONTEXT_WINDOW_SCENES);
    accepted[start..]
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the prompt for one scene
pub fn build_scene_prompt(ctx: &ScenePromptContext<'_>) -> String {
    let beat = ctx.beat;
    let rulebook = ctx.rulebook;
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Write Scene {} for our {} transformation of {}.\n\n",
        ctx.scene_number, ctx.target_world_name, ctx.story_name
    ));

    prompt.push_str(&format!("PLOT BEAT: {}\n", beat.beat_name));
    prompt.push_str(&format!("Description: {}\n", beat.description));
    prompt.push_str(&format!("Target Emotion: {}\n", beat.emotion));
    prompt.push_str(&format!("Act: {}\n\n", beat.act));

    prompt.push_str("WORLD SETTING (MUST FOLLOW):\n");
    for (key, value) in &rulebook.world_setting {
        prompt.push_str(&format!("- {}: {}\n", key, value));
    }
    prompt.push('\n');

    prompt.push_str("CHARACTER NAMES (USE THESE ONLY, NEVER USE ORIGINALS):\n");
    for mapping in &rulebook.character_mappings {
        prompt.push_str(&format!(
            "- {} is now called: {} ({})\n",
            mapping.original, mapping.new_world, mapping.role
        ));
    }
    prompt.push('\n');

    prompt.push_str("PLOT TRANSLATION:\n");
    prompt.push_str(rulebook.translation_for(beat));
    prompt.push_str("\n\n");

    prompt.push_str("HARD CONSTRAINTS (MUST FOLLOW):\n");
    for constraint in &rulebook.constraints {
        prompt.push_str(&format!("- {}\n", constraint));
    }
    prompt.push('\n');

    prompt.push_str("FORBIDDEN (NEVER USE):\n");
    for term in &rulebook.forbidden_elements {
        prompt.push_str(&format!("- {}\n", term));
    }
    prompt.push('\n');

    prompt.push_str("PREVIOUS CONTEXT:\n");
    prompt.push_str(ctx.previous_context);
    prompt.push_str("\n\n");

    prompt.push_str("REQUIREMENTS:\n");
    prompt.push_str("- Write 350-450 words\n");
    prompt.push_str("- Use vivid, engaging prose\n");
    prompt.push_str("- Show character emotions and motivations\n");
    prompt.push_str(&format!(
        "- Ground everything in the {} world\n",
        ctx.target_world_name
    ));
    prompt.push_str(&format!("- Maintain theme: {}\n", ctx.theme));
    prompt.push_str("- Use ONLY the new character names provided above\n");
    prompt.push_str("- NO supernatural elements - only technology\n");
    prompt.push_str("- Make it feel like a natural continuation\n\n");
    prompt.push_str("Write the scene now:");

    prompt
}

/// Extend a base prompt with feedback about what the last attempt got wrong
pub fn build_correction_prompt(base_prompt: &str, violations: &[Violation]) -> String {
    let details = violations
        .iter()
        .map(Violation::feedback_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"{base_prompt}

CRITICAL CORRECTIONS NEEDED:
Your previous attempt had these violations that MUST be fixed:

{details}

Please regenerate the scene fixing ALL the above issues while maintaining:
- Narrative quality and engagement
- Character development
- Plot progression
- Emotional impact

Do NOT:
- Use original character names
- Reference forbidden elements
- Include supernatural/mystical elements
- Ignore world constraints"#
    )
}

/// Theme passed to every scene prompt
pub fn scene_theme(essence: &StoryEssence) -> &str {
    essence.primary_theme().unwrap_or("the story's central conflict")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CharacterMapping;
    use crate::domain::value_objects::{Severity, ViolationKind};

    fn rulebook() -> Rulebook {
        Rulebook::new()
            .with_setting("time_period", "2045")
            .with_setting("location", "Silicon Valley")
            .with_mapping(CharacterMapping::new("Rama", "Kade-7").with_role("lead engineer"))
            .with_translation("exile", "Fired and blacklisted from every lab")
            .with_constraint("No character may use their original name")
            .with_forbidden("magic")
    }

    fn prompt_for(beat: &PlotBeat, rulebook: &Rulebook, context: &str) -> String {
        build_scene_prompt(&ScenePromptContext {
            scene_number: 2,
            beat,
            rulebook,
            previous_context: context,
            theme: "duty vs desire",
            story_name: "Ramayana",
            target_world_name: "Cyberpunk 2045",
        })
    }

    #[test]
    fn test_scene_prompt_embeds_rulebook() {
        let beat = PlotBeat::new("exile", "The heir is cast out")
            .with_emotion("grief")
            .in_act(1);
        let prompt = prompt_for(&beat, &rulebook(), OPENING_SCENE_CONTEXT);

        assert!(prompt.starts_with("Write Scene 2 for our Cyberpunk 2045 transformation of Ramayana."));
        assert!(prompt.contains("PLOT BEAT: exile"));
        assert!(prompt.contains("Target Emotion: grief"));
        assert!(prompt.contains("- time_period: 2045"));
        assert!(prompt.contains("- Rama is now called: Kade-7 (lead engineer)"));
        assert!(prompt.contains("Fired and blacklisted from every lab"));
        assert!(prompt.contains("- No character may use their original name"));
        assert!(prompt.contains("FORBIDDEN (NEVER USE):\n- magic"));
        assert!(prompt.contains("PREVIOUS CONTEXT:\nThis is the opening scene."));
        assert!(prompt.contains("Maintain theme: duty vs desire"));
    }

    #[test]
    fn test_scene_prompt_falls_back_to_beat_description() {
        let beat = PlotBeat::new("abduction", "A loved one is taken");
        let prompt = prompt_for(&beat, &rulebook(), OPENING_SCENE_CONTEXT);
        assert!(prompt.contains("PLOT TRANSLATION:\nA loved one is taken"));
    }

    #[test]
    fn test_context_window_keeps_last_two_scenes() {
        assert_eq!(build_context_window(&[]), OPENING_SCENE_CONTEXT);

        let one = vec![Scene::new(1, "a", "Scene one.")];
        assert_eq!(build_context_window(&one), "Scene one.");

        let three = vec![
            Scene::new(1, "a", "Scene one."),
            Scene::new(2, "b", "Scene two."),
            Scene::new(3, "c", "Scene three."),
        ];
        assert_eq!(build_context_window(&three), "Scene two.\n\nScene three.");
    }

    #[test]
    fn test_correction_prompt_lists_every_violation() {
        let violations = vec![
            Violation::new(ViolationKind::CharacterName, Severity::High, "Found 'Rama' - should be 'Kade-7'")
                .with_suggestion("Use 'Kade-7' instead"),
            Violation::new(ViolationKind::ForbiddenElement, Severity::High, "Contains forbidden term: 'magic'"),
        ];
        let prompt = build_correction_prompt("BASE PROMPT", &violations);

        assert!(prompt.starts_with("BASE PROMPT\n\nCRITICAL CORRECTIONS NEEDED:"));
        assert!(prompt.contains("- Found 'Rama' - should be 'Kade-7'. Use 'Kade-7' instead"));
        assert!(prompt.contains("- Contains forbidden term: 'magic'. "));
        assert!(prompt.ends_with("- Ignore world constraints"));
    }

    #[test]
    fn test_rulebook_prompt_lists_themes() {
        let themes = vec!["duty".to_string(), "loyalty".to_string()];
        let prompt = build_rulebook_prompt("{}", "Wild West 1800s", &themes);
        assert!(prompt.contains("Target World: Wild West 1800s"));
        assert!(prompt.contains("Preserve core themes: duty, loyalty"));
    }

    #[test]
    fn test_extraction_prompt_embeds_story() {
        let prompt = build_extraction_prompt("Once upon a time.");
        assert!(prompt.contains("Story:\nOnce upon a time.\n"));
        assert!(prompt.ends_with("Return ONLY valid JSON matching this structure."));
    }
}
