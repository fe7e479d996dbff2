//! Completion backend abstraction.
//!
//! The [`Completer`] trait decouples prompt construction and parsing from the
//! hosted model. [`GeminiCompleter`] calls the `generateContent` endpoint with
//! a JSON response schema; tests use scripted completers instead.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::io::config::QuestConfig;

/// A single prompt plus the JSON schema its reply must follow.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub response_schema: Value,
}

/// Abstraction over text-completion backends.
pub trait Completer {
    /// Return the raw reply text. `Err` means the round-trip itself failed.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

impl<C: Completer + ?Sized> Completer for &C {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }
}

/// Completer backed by the Gemini `generateContent` REST endpoint.
pub struct GeminiCompleter {
    agent: ureq::Agent,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiCompleter {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from config, reading the API key from `cfg.api_key_env`.
    pub fn from_config(cfg: &QuestConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env)
            .with_context(|| format!("environment variable {} is not set", cfg.api_key_env))?;
        Ok(Self::new(
            cfg.base_url.clone(),
            cfg.model.clone(),
            api_key,
            cfg.request_timeout(),
        ))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl Completer for GeminiCompleter {
    #[instrument(skip_all, fields(model = %self.model, prompt_bytes = request.prompt.len()))]
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        info!("requesting completion");
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_json_schema: request.response_schema.clone(),
            },
        };

        let response = self
            .agent
            .post(&self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .send_json(&body)
            .context("call generateContent")?;
        let parsed: GenerateResponse = response
            .into_body()
            .read_json()
            .context("decode generateContent response")?;

        // A 200 without text is still a reply; parsing turns it into fallback feedback.
        let Some(text) = parsed.first_text() else {
            warn!(
                finish_reason = parsed.finish_reason().unwrap_or("none"),
                "generateContent response contained no text"
            );
            return Ok(String::new());
        };
        debug!(reply_bytes = text.len(), "completion received");
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_json_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|part| part.text.as_str()).collect();
        (!text.is_empty()).then_some(text)
    }

    fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}
