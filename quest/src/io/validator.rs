//! Validation client: one round-trip to the model per advance.

use anyhow::Result;
use tracing::{debug, instrument, warn};

use crate::core::feedback::Feedback;
use crate::core::record::ProgramDesign;
use crate::core::step::QuestStep;
use crate::io::completion::{Completer, CompletionRequest};
use crate::io::prompt::PromptBuilder;
use crate::io::schema::JsonContract;

/// Builds the step prompt, calls the completer and parses its reply.
pub struct Validator<C> {
    completer: C,
    prompts: PromptBuilder,
    contract: JsonContract,
}

impl<C: Completer> Validator<C> {
    pub fn new(completer: C) -> Result<Self> {
        Ok(Self {
            completer,
            prompts: PromptBuilder::new(),
            contract: JsonContract::feedback()?,
        })
    }

    pub fn completer(&self) -> &C {
        &self.completer
    }

    /// Judge `record` as of `step`.
    ///
    /// A reply that is not a schema-conforming feedback object yields
    /// [`Feedback::validator_fallback`]. `Err` only surfaces when the
    /// completer itself fails (unreachable endpoint, timeout, HTTP error).
    #[instrument(skip_all, fields(step = %step))]
    pub fn validate(&self, step: QuestStep, record: &ProgramDesign) -> Result<Feedback> {
        let prompt = self.prompts.build_validation(step, record)?;
        let request = CompletionRequest {
            prompt,
            response_schema: self.contract.schema().clone(),
        };
        let raw = self.completer.complete(&request)?;
        let feedback = self.parse_feedback(&raw);
        debug!(status = ?feedback.status, logic_break = feedback.logic_break, "feedback parsed");
        Ok(feedback)
    }

    /// Parse a raw reply, substituting the fallback on any failure.
    pub fn parse_feedback(&self, raw: &str) -> Feedback {
        match self.contract.parse::<Feedback>(raw) {
            Ok(feedback) => feedback,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "unusable validator reply, using fallback");
                Feedback::validator_fallback()
            }
        }
    }
}
