//! Domain layer - Story material and the rules it is checked against
//!
//! This layer contains:
//! - Entities: StoryEssence, Rulebook, Scene
//! - Value Objects: Violation, ViolationLog, RunId
//! - Domain Services: constraint validation over generated text

pub mod entities;
pub mod services;
pub mod value_objects;
