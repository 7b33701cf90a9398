//! Value objects - Immutable objects defined by their attributes

mod ids;
mod violation;
mod violation_log;

pub use ids::RunId;
pub use violation::{Severity, Violation, ViolationKind};
pub use violation_log::{ViolationLog, ViolationSummary};
