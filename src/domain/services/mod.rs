//! Domain services - Pure operations over domain objects

mod constraint_validator;

pub use constraint_validator::{ConstraintValidator, KeywordValidator};
