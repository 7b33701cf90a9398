//! Story artifact writer

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::application::dto::{RulebookDto, StoryEssenceDto, TransformationResult};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// File-name stem for a story: alphanumerics, spaces and hyphens kept,
/// spaces turned into underscores, lowercased
pub fn safe_story_name(story_name: &str) -> String {
    story_name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Render the final story with its title header and closing notes
pub fn render_story_markdown(result: &TransformationResult) -> String {
    let metadata = &result.metadata;
    let mut md = String::new();

    md.push_str(&format!(
        "# {} {}\n\n",
        metadata.source_story, metadata.target_world
    ));
    md.push_str(&format!(
        "*A transformation of the classic tale to {}*\n\n",
        metadata.target_world
    ));
    md.push_str("---\n\n");
    md.push_str(&result.story);
    md.push_str("\n\n---\n\n");

    md.push_str("## About This Story\n\n");
    md.push_str(
        "This story was generated through a systematic 3-stage transformation pipeline:\n\n",
    );
    md.push_str("1. **DNA Extraction**: Identified themes, characters, and plot structure\n");
    md.push_str("2. **Rulebook Building**: Created transformation rules for the target world\n");
    md.push_str("3. **Constrained Generation**: Generated with active validation\n\n");
    md.push_str(&format!(
        "**Themes preserved**: {}\n\n",
        result.essence.themes.join(", ")
    ));
    md.push_str(&format!(
        "**Constraint enforcement**: detected and corrected {} violations\n",
        result.violations.total_violations
    ));

    md
}

/// Locations of the files written for one run
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub essence: PathBuf,
    pub rulebook: PathBuf,
    pub story: PathBuf,
    pub constraint_log: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    fn new(output_dir: &Path, story_name: &str) -> Self {
        let stem = safe_story_name(story_name);
        Self {
            essence: output_dir.join(format!("story_dna_{}.json", stem)),
            rulebook: output_dir.join(format!("transformation_rules_{}.json", stem)),
            story: output_dir.join(format!("final_story_{}.md", stem)),
            constraint_log: output_dir.join(format!("constraint_log_{}.json", stem)),
            metadata: output_dir.join(format!("metadata_{}.json", stem)),
        }
    }

    pub fn all(&self) -> [&Path; 5] {
        [
            &self.essence,
            &self.rulebook,
            &self.story,
            &self.constraint_log,
            &self.metadata,
        ]
    }
}

/// Writes run artifacts under an output directory
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write all five artifacts, creating the output directory if needed
    ///
    /// Files are named after the run's source story, so a later run of the
    /// same story overwrites them.
    pub async fn save(&self, result: &TransformationResult) -> Result<ArtifactPaths, ArtifactError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| ArtifactError::Io {
                path: self.output_dir.clone(),
                source,
            })?;

        let paths = ArtifactPaths::new(&self.output_dir, &result.metadata.source_story);

        write_json(&paths.essence, "story essence", &StoryEssenceDto::from(&result.essence)).await?;
        write_json(&paths.rulebook, "rulebook", &RulebookDto::from(&result.rulebook)).await?;
        write_text(&paths.story, render_story_markdown(result)).await?;
        write_json(&paths.constraint_log, "constraint log", &result.violations).await?;
        write_json(&paths.metadata, "metadata", &result.metadata).await?;

        tracing::info!(dir = %self.output_dir.display(), "Saved transformation artifacts");
        Ok(paths)
    }
}

async fn write_json<T: Serialize>(
    path: &Path,
    what: &'static str,
    value: &T,
) -> Result<(), ArtifactError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|source| ArtifactError::Serialize { what, source })?;
    write_text(path, json).await
}

async fn write_text(path: &Path, contents: String) -> Result<(), ArtifactError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })
}
