//! Export of the finished design and its plain-text summary.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::core::record::ProgramDesign;

/// Date stamped on export file names: the current UTC calendar day.
pub fn export_date() -> NaiveDate {
    Utc::now().date_naive()
}

/// `impact_quest_design_<YYYY-MM-DD>.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("impact_quest_design_{}.json", date.format("%Y-%m-%d"))
}

/// Write a pretty-printed snapshot of `record` into `dir`.
///
/// An export made later the same day replaces the earlier one.
pub fn export_record(dir: &Path, record: &ProgramDesign, date: NaiveDate) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create export dir {}", dir.display()))?;
    let path = dir.join(export_file_name(date));
    let mut payload = serde_json::to_string_pretty(record).context("serialize design")?;
    payload.push('\n');
    fs::write(&path, payload).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "design exported");
    Ok(path)
}

/// Read back an exported snapshot.
pub fn load_export(path: &Path) -> Result<ProgramDesign> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

/// Render the finished design grouped by quest level.
pub fn render_summary(record: &ProgramDesign) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Level 1: The Anchor");
    let _ = writeln!(out, "  Problem: {}", record.problem);
    let _ = writeln!(out, "  Outcome: {}", record.target_outcome);
    let _ = writeln!(out, "Level 2: The Blueprint");
    let _ = writeln!(out, "  Theme: {}", record.theme);
    let _ = writeln!(out, "  Methodology: {}", record.methodology);
    let _ = writeln!(out, "Level 3 & 4: System & Shifts");
    let _ = writeln!(out, "  Stakeholders: {}", record.stakeholders.join(", "));
    for change in &record.practice_changes {
        let orphan = if record.has_stakeholder(&change.stakeholder) {
            ""
        } else {
            " (no longer mapped)"
        };
        let _ = writeln!(
            out,
            "  {}{}: \"{}\"",
            change.stakeholder, orphan, change.behavior
        );
    }
    let _ = writeln!(out, "Level 5: The Pulse");
    for indicator in &record.indicators {
        let _ = writeln!(out, "  - {indicator}");
    }
    out
}
