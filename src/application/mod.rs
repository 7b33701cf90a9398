//! Application layer - Use cases that drive a story transformation
//!
//! This layer contains:
//! - Ports: the completion service interface
//! - Services: prompt building, constraint enforcement, pipeline orchestration
//! - DTOs: the JSON shapes exchanged with the LLM and written as artifacts

pub mod dto;
pub mod ports;
pub mod services;
