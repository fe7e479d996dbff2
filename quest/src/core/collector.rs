//! Step input collection: turns user edits into [`RecordPatch`] values.
//!
//! Helpers compute the full replacement sequence from the current record, so
//! merging the returned patch is all the caller has to do. `None` means the
//! edit was a no-op (blank input, duplicate stakeholder).

use anyhow::{Result, anyhow, bail};

use crate::core::record::{PracticeChange, ProgramDesign, RecordPatch, THEMES, TextField};
use crate::core::step::QuestStep;

/// The step whose form owns `field`.
pub fn owning_step(field: TextField) -> QuestStep {
    match field {
        TextField::Problem | TextField::TargetOutcome => QuestStep::Anchor,
        TextField::Theme | TextField::Methodology => QuestStep::Blueprint,
    }
}

pub fn set_text(field: TextField, value: &str) -> RecordPatch {
    let value = Some(value.trim().to_string());
    match field {
        TextField::Problem => RecordPatch {
            problem: value,
            ..RecordPatch::default()
        },
        TextField::TargetOutcome => RecordPatch {
            target_outcome: value,
            ..RecordPatch::default()
        },
        TextField::Theme => RecordPatch {
            theme: value,
            ..RecordPatch::default()
        },
        TextField::Methodology => RecordPatch {
            methodology: value,
            ..RecordPatch::default()
        },
    }
}

/// Pick a theme by 1-based position in [`THEMES`] or by free text.
pub fn set_theme(choice: &str) -> Result<RecordPatch> {
    let choice = choice.trim();
    if choice.is_empty() {
        bail!("theme cannot be blank");
    }
    if let Ok(index) = choice.parse::<usize>() {
        let theme = index
            .checked_sub(1)
            .and_then(|i| THEMES.get(i))
            .ok_or_else(|| anyhow!("theme number must be 1-{}", THEMES.len()))?;
        return Ok(set_text(TextField::Theme, theme));
    }
    let theme = THEMES
        .iter()
        .find(|theme| theme.eq_ignore_ascii_case(choice))
        .copied()
        .unwrap_or(choice);
    Ok(set_text(TextField::Theme, theme))
}

pub fn add_stakeholder(record: &ProgramDesign, label: &str) -> Option<RecordPatch> {
    let label = label.trim();
    if label.is_empty() || record.has_stakeholder(label) {
        return None;
    }
    let mut stakeholders = record.stakeholders.clone();
    stakeholders.push(label.to_string());
    Some(RecordPatch {
        stakeholders: Some(stakeholders),
        ..RecordPatch::default()
    })
}

/// Remove the stakeholder at `index` (0-based). Practice changes are left alone.
pub fn remove_stakeholder(record: &ProgramDesign, index: usize) -> Result<RecordPatch> {
    let stakeholders = remove_at(&record.stakeholders, index, "stakeholder")?;
    Ok(RecordPatch {
        stakeholders: Some(stakeholders),
        ..RecordPatch::default()
    })
}

/// Record `behavior` for a present stakeholder, replacing any earlier entry.
pub fn set_behavior(
    record: &ProgramDesign,
    stakeholder: &str,
    behavior: &str,
) -> Result<RecordPatch> {
    if !record.has_stakeholder(stakeholder) {
        bail!("'{stakeholder}' is not a mapped stakeholder");
    }
    let mut changes: Vec<PracticeChange> = record
        .practice_changes
        .iter()
        .filter(|change| change.stakeholder != stakeholder)
        .cloned()
        .collect();
    changes.push(PracticeChange {
        stakeholder: stakeholder.to_string(),
        behavior: behavior.trim().to_string(),
    });
    Ok(RecordPatch {
        practice_changes: Some(changes),
        ..RecordPatch::default()
    })
}

pub fn add_indicator(record: &ProgramDesign, indicator: &str) -> Option<RecordPatch> {
    let indicator = indicator.trim();
    if indicator.is_empty() {
        return None;
    }
    let mut indicators = record.indicators.clone();
    indicators.push(indicator.to_string());
    Some(RecordPatch {
        indicators: Some(indicators),
        ..RecordPatch::default()
    })
}

pub fn remove_indicator(record: &ProgramDesign, index: usize) -> Result<RecordPatch> {
    let indicators = remove_at(&record.indicators, index, "indicator")?;
    Ok(RecordPatch {
        indicators: Some(indicators),
        ..RecordPatch::default()
    })
}

fn remove_at(items: &[String], index: usize, what: &str) -> Result<Vec<String>> {
    if index >= items.len() {
        bail!(
            "no {what} #{} (there are {})",
            index + 1,
            items.len()
        );
    }
    let mut items = items.to_vec();
    items.remove(index);
    Ok(items)
}
