//! Domain entities - The story material that flows through a transformation

mod essence;
mod rulebook;
mod scene;

pub use essence::{CharacterProfile, PlotBeat, StoryEssence};
pub use rulebook::{CharacterMapping, Rulebook};
pub use scene::{assemble_story, Scene};
