//! JSON reply contracts: the schema sent to the model and the check applied
//! to what comes back.

use anyhow::{Context, Result, bail};
use jsonschema::Draft;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const FEEDBACK_SCHEMA: &str = include_str!("../../schemas/feedback.schema.json");
pub const BRIEF_SCHEMA: &str = include_str!("../../schemas/brief.schema.json");

/// A compiled JSON Schema (Draft 2020-12) paired with its raw form.
pub struct JsonContract {
    schema: Value,
    compiled: jsonschema::Validator,
}

impl JsonContract {
    pub fn compile(raw: &str) -> Result<Self> {
        let schema: Value = serde_json::from_str(raw).context("parse schema json")?;
        let compiled = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .context("compile json schema")?;
        Ok(Self { schema, compiled })
    }

    pub fn feedback() -> Result<Self> {
        Self::compile(FEEDBACK_SCHEMA)
    }

    pub fn brief() -> Result<Self> {
        Self::compile(BRIEF_SCHEMA)
    }

    /// The schema as sent alongside a completion request.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Trim, strip a Markdown fence, check against the schema and decode.
    pub fn parse<T: DeserializeOwned>(&self, raw: &str) -> Result<T> {
        let text = strip_code_fences(raw);
        let value: Value = serde_json::from_str(text).context("parse reply json")?;
        let messages: Vec<String> = self
            .compiled
            .iter_errors(&value)
            .map(|err| err.to_string())
            .collect();
        if !messages.is_empty() {
            bail!("reply violates schema:\n- {}", messages.join("\n- "));
        }
        serde_json::from_value(value).context("decode reply")
    }
}

/// Strip a surrounding ```` ```json ... ``` ```` fence, if present.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with("```") {
        return text;
    }
    let Some(newline) = text.find('\n') else {
        return text;
    };
    let body = &text[newline + 1..];
    match body.rfind("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}
