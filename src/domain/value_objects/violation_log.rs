//! Violation log - Per-attempt record of what the validator caught during a run

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Violation, ViolationKind};

/// Characters of generated text kept in a log entry
pub const PREVIEW_CHARS: usize = 200;

/// One failed attempt at generating a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationLogEntry {
    pub scene: usize,
    /// 1-based attempt number within the scene
    pub attempt: u32,
    pub violations: Vec<Violation>,
    pub text_preview: String,
}

/// Append-only accumulator owned by a single transformation run
#[derive(Debug, Clone, Default)]
pub struct ViolationLog {
    entries: Vec<ViolationLogEntry>,
}

impl ViolationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed attempt
    pub fn record(&mut self, scene: usize, attempt: u32, violations: Vec<Violation>, text: &str) {
        self.entries.push(ViolationLogEntry {
            scene,
            attempt,
            violations,
            text_preview: preview(text),
        });
    }

    pub fn entries(&self) -> &[ViolationLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_violations(&self) -> usize {
        self.entries.iter().map(|e| e.violations.len()).sum()
    }

    /// Number of distinct scenes that needed at least one correction
    pub fn scenes_with_violations(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.scene)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn counts_by_kind(&self) -> BTreeMap<ViolationKind, usize> {
        let mut counts = BTreeMap::new();
        for violation in self.entries.iter().flat_map(|e| &e.violations) {
            *counts.entry(violation.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn summary(&self) -> ViolationSummary {
        ViolationSummary {
            total_violations: self.total_violations(),
            scenes_with_violations: self.scenes_with_violations(),
            failed_attempts: self.len(),
            violation_types: self
                .counts_by_kind()
                .into_iter()
                .map(|(kind, count)| (kind.as_str().to_string(), count))
                .collect(),
            detailed_log: self.entries().to_vec(),
        }
    }
}

/// Summary statistics written alongside the detailed log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationSummary {
    pub total_violations: usize,
    pub scenes_with_violations: usize,
    pub failed_attempts: usize,
    pub violation_types: BTreeMap<String, usize>,
    pub detailed_log: Vec<ViolationLogEntry>,
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}
