//! Pre-fill the Anchor and Blueprint fields from a free-text program brief.
//!
//! Unlike validation there is no fallback: a failed call or unusable reply is
//! returned as an error and the caller decides whether to continue.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::record::RecordPatch;
use crate::io::completion::{Completer, CompletionRequest};
use crate::io::prompt::PromptBuilder;
use crate::io::schema::JsonContract;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BriefExtraction {
    theme: Option<String>,
    problem: Option<String>,
    target_outcome: Option<String>,
    /// Requested from the model but not part of the record.
    geography: Option<String>,
}

/// Ask the model to pull theme, problem and target outcome out of `text`.
///
/// Blank values are dropped so they do not overwrite existing fields.
#[instrument(skip_all, fields(text_bytes = text.len()))]
pub fn extract_brief<C: Completer>(completer: &C, text: &str) -> Result<RecordPatch> {
    let contract = JsonContract::brief()?;
    let request = CompletionRequest {
        prompt: PromptBuilder::new().build_brief(text)?,
        response_schema: contract.schema().clone(),
    };
    let raw = completer.complete(&request).context("extract brief")?;
    let extraction: BriefExtraction = contract.parse(&raw).context("parse brief reply")?;
    if let Some(geography) = non_blank(extraction.geography) {
        debug!(%geography, "brief mentions a geography; not part of the record");
    }
    Ok(RecordPatch {
        theme: non_blank(extraction.theme),
        problem: non_blank(extraction.problem),
        target_outcome: non_blank(extraction.target_outcome),
        ..RecordPatch::default()
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
