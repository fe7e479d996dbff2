//! The program design record (a Logical Framework Approach draft).
//!
//! The record is deliberately permissive: no field must be non-empty and
//! practice changes are not reconciled against the stakeholder list. Judging
//! completeness is the validator's job.

use serde::{Deserialize, Serialize};

/// Theme labels offered by the Blueprint step. The record itself accepts any text.
pub const THEMES: [&str; 4] = ["FLN", "Career Readiness", "Life Skills", "STEM"];

/// Observable behavior change expected from one stakeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeChange {
    pub stakeholder: String,
    pub behavior: String,
}

/// The document under construction.
///
/// Serializes to the export artifact layout (`problem`, `targetOutcome`,
/// `theme`, `methodology`, `stakeholders`, `practiceChanges`, `indicators`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramDesign {
    pub problem: String,
    pub target_outcome: String,
    pub theme: String,
    pub methodology: String,
    /// Unique labels in insertion order.
    pub stakeholders: Vec<String>,
    /// At most one entry per stakeholder.
    pub practice_changes: Vec<PracticeChange>,
    pub indicators: Vec<String>,
}

/// Partial update issued by a step's input collector.
///
/// `None` leaves a field untouched. Sequence fields replace the whole
/// sequence; computing appends and removals is the caller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stakeholders: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practice_changes: Option<Vec<PracticeChange>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<Vec<String>>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        *self == RecordPatch::default()
    }
}

/// Free-text fields that can be edited directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Problem,
    TargetOutcome,
    Theme,
    Methodology,
}

impl TextField {
    pub fn label(self) -> &'static str {
        match self {
            TextField::Problem => "problem",
            TextField::TargetOutcome => "outcome",
            TextField::Theme => "theme",
            TextField::Methodology => "methodology",
        }
    }
}

impl ProgramDesign {
    /// Shallow-merge `patch` into the record.
    pub fn merge(&mut self, patch: RecordPatch) {
        let RecordPatch {
            problem,
            target_outcome,
            theme,
            methodology,
            stakeholders,
            practice_changes,
            indicators,
        } = patch;

        if let Some(problem) = problem {
            self.problem = problem;
        }
        if let Some(target_outcome) = target_outcome {
            self.target_outcome = target_outcome;
        }
        if let Some(theme) = theme {
            self.theme = theme;
        }
        if let Some(methodology) = methodology {
            self.methodology = methodology;
        }
        if let Some(stakeholders) = stakeholders {
            self.stakeholders = stakeholders;
        }
        if let Some(practice_changes) = practice_changes {
            self.practice_changes = practice_changes;
        }
        if let Some(indicators) = indicators {
            self.indicators = indicators;
        }
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Problem => &self.problem,
            TextField::TargetOutcome => &self.target_outcome,
            TextField::Theme => &self.theme,
            TextField::Methodology => &self.methodology,
        }
    }

    pub fn has_stakeholder(&self, stakeholder: &str) -> bool {
        self.stakeholders.iter().any(|s| s == stakeholder)
    }

    /// Behavior recorded for `stakeholder`, if any.
    pub fn behavior_for(&self, stakeholder: &str) -> Option<&str> {
        self.practice_changes
            .iter()
            .find(|change| change.stakeholder == stakeholder)
            .map(|change| change.behavior.as_str())
    }

    /// Practice changes whose stakeholder is no longer in the stakeholder list.
    ///
    /// Stakeholder removal does not prune these; they are kept and reported.
    pub fn orphaned_practice_changes(&self) -> Vec<&PracticeChange> {
        self.practice_changes
            .iter()
            .filter(|change| !self.has_stakeholder(&change.stakeholder))
            .collect()
    }
}
