//! The fixed six-stage quest sequence.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Ordered position in the quest.
///
/// The discriminants are the 1-based level numbers shown to the user.
/// `Anchor` is initial (no retreat) and `Export` is terminal (no advance).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum QuestStep {
    Anchor = 1,
    Blueprint = 2,
    Alliance = 3,
    Shift = 4,
    Pulse = 5,
    Export = 6,
}

impl QuestStep {
    /// Every step in quest order.
    pub const ALL: [QuestStep; 6] = [
        QuestStep::Anchor,
        QuestStep::Blueprint,
        QuestStep::Alliance,
        QuestStep::Shift,
        QuestStep::Pulse,
        QuestStep::Export,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    /// The following step, or `None` at the terminal step.
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    /// The preceding step, or `None` at the initial step.
    pub fn prev(self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    pub fn is_initial(self) -> bool {
        self == QuestStep::Anchor
    }

    pub fn is_terminal(self) -> bool {
        self == QuestStep::Export
    }

    /// Stable lowercase identifier (CLI arguments, template names).
    pub fn slug(self) -> &'static str {
        match self {
            QuestStep::Anchor => "anchor",
            QuestStep::Blueprint => "blueprint",
            QuestStep::Alliance => "alliance",
            QuestStep::Shift => "shift",
            QuestStep::Pulse => "pulse",
            QuestStep::Export => "export",
        }
    }

    /// Short label used in the progress line.
    pub fn label(self) -> &'static str {
        match self {
            QuestStep::Anchor => "Anchor",
            QuestStep::Blueprint => "Blueprint",
            QuestStep::Alliance => "Alliance",
            QuestStep::Shift => "Shift",
            QuestStep::Pulse => "Pulse",
            QuestStep::Export => "Finish",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            QuestStep::Anchor => "The Anchor",
            QuestStep::Blueprint => "The Blueprint",
            QuestStep::Alliance => "The Alliance",
            QuestStep::Shift => "The Shift",
            QuestStep::Pulse => "The Pulse",
            QuestStep::Export => "Quest Completed!",
        }
    }

    /// One-line instruction for what the user fills in at this step.
    pub fn brief(self) -> &'static str {
        match self {
            QuestStep::Anchor => "Define the core problem and the target student outcome.",
            QuestStep::Blueprint => "Select a theme and the primary methodology.",
            QuestStep::Alliance => "Map stakeholders across the system ecosystem.",
            QuestStep::Shift => "Define practice changes - observable behaviors.",
            QuestStep::Pulse => "Select indicators to measure success.",
            QuestStep::Export => "Review the finished design and export it as JSON.",
        }
    }
}

impl fmt::Display for QuestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for QuestStep {
    type Err = anyhow::Error;

    /// Accepts a slug (`anchor`), a label (`Finish`) or a level number (`1`).
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        if let Ok(number) = needle.parse::<u8>() {
            return Self::from_number(number)
                .ok_or_else(|| anyhow!("step number must be 1-6, got {number}"));
        }
        Self::ALL
            .into_iter()
            .find(|step| {
                step.slug().eq_ignore_ascii_case(needle) || step.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| anyhow!("unknown step '{needle}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_stops_at_export() {
        assert_eq!(QuestStep::Pulse.next(), Some(QuestStep::Export));
        assert_eq!(QuestStep::Export.next(), None);
    }

    #[test]
    fn prev_stops_at_anchor() {
        assert_eq!(QuestStep::Blueprint.prev(), Some(QuestStep::Anchor));
        assert_eq!(QuestStep::Anchor.prev(), None);
    }

    #[test]
    fn numbers_follow_quest_order() {
        let numbers: Vec<u8> = QuestStep::ALL.iter().map(|step| step.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert!(QuestStep::Anchor < QuestStep::Export);
    }

    #[test]
    fn parses_slug_label_and_number() {
        assert_eq!("shift".parse::<QuestStep>().unwrap(), QuestStep::Shift);
        assert_eq!("Finish".parse::<QuestStep>().unwrap(), QuestStep::Export);
        assert_eq!("2".parse::<QuestStep>().unwrap(), QuestStep::Blueprint);
        assert!("0".parse::<QuestStep>().is_err());
        assert!("summit".parse::<QuestStep>().is_err());
    }
}
