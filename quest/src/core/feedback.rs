//! Validator feedback for a single step.

use serde::{Deserialize, Serialize};

/// Message used when the model's reply cannot be parsed into [`Feedback`].
pub const VALIDATOR_FALLBACK_MESSAGE: &str =
    "The AI companion is momentarily confused. Please continue, your logic looks solid!";

/// Message used when the validation call itself fails.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "The logic engine hit a snag. Let's push forward anyway!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Valid,
    Warning,
    Error,
}

impl FeedbackStatus {
    /// `valid` and `warning` let the quest move on; `error` blocks it.
    pub fn allows_advance(self) -> bool {
        matches!(self, FeedbackStatus::Valid | FeedbackStatus::Warning)
    }

    pub fn headline(self) -> &'static str {
        match self {
            FeedbackStatus::Valid => "Logic Secure",
            FeedbackStatus::Warning => "Logic Alert",
            FeedbackStatus::Error => "Logic Break",
        }
    }
}

/// The validator's judgement of the current step's data.
///
/// `suggestions` and `logicBreak` may be absent on the wire; they default to
/// an empty list and `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub status: FeedbackStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// Critical inconsistency flagged by the model.
    #[serde(default)]
    pub logic_break: bool,
}

impl Feedback {
    pub fn new(status: FeedbackStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            suggestions: Vec::new(),
            logic_break: false,
        }
    }

    pub fn validator_fallback() -> Self {
        Self::new(FeedbackStatus::Error, VALIDATOR_FALLBACK_MESSAGE)
    }

    pub fn transport_failure() -> Self {
        Self::new(FeedbackStatus::Error, TRANSPORT_FAILURE_MESSAGE)
    }
}
