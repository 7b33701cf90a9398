//! Artifact export
//!
//! Writes every stage's output to the output directory so a run can be
//! inspected after the fact: the extracted essence, the rulebook, the
//! final story as markdown, the constraint log, and the run metadata.

mod story_artifacts;

pub use story_artifacts::ArtifactWriter;
