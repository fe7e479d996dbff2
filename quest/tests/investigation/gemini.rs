//! Investigation tests for Gemini structured output via `responseJsonSchema`.
//!
//! # Prerequisites
//!
//! - Network access to `generativelanguage.googleapis.com`
//! - `GEMINI_API_KEY` set in the environment
//!
//! # Running
//!
//! ```bash
//! cargo test -p quest --test investigation gemini -- --ignored --nocapture
//! ```

use std::time::Duration;

use quest::core::step::QuestStep;
use quest::io::brief::extract_brief;
use quest::io::completion::GeminiCompleter;
use quest::io::config::QuestConfig;
use quest::io::validator::Validator;
use quest::test_support::sample_design;

/// Longer than the default so slow model responses are still observed.
const LIVE_TIMEOUT: Duration = Duration::from_secs(90);

fn live_completer() -> GeminiCompleter {
    let cfg = QuestConfig::default();
    let api_key = std::env::var(&cfg.api_key_env)
        .unwrap_or_else(|_| panic!("{} must be set for investigation tests", cfg.api_key_env));
    GeminiCompleter::new(cfg.base_url, cfg.model, api_key, LIVE_TIMEOUT)
}

/// A well-formed record should come back as schema-conforming feedback, never
/// as the parse fallback.
#[test]
#[ignore]
fn gemini_returns_schema_conforming_feedback() {
    let validator = Validator::new(live_completer()).expect("validator");
    let record = sample_design();

    for step in [QuestStep::Anchor, QuestStep::Shift, QuestStep::Export] {
        let feedback = validator.validate(step, &record).expect("live call");
        println!("{step}: {feedback:?}");
        assert_ne!(
            feedback,
            quest::core::feedback::Feedback::validator_fallback(),
            "{step} reply did not match the feedback schema"
        );
        assert!(!feedback.message.trim().is_empty());
    }
}

#[test]
#[ignore]
fn gemini_extracts_brief_fields() {
    let completer = live_completer();
    let patch = extract_brief(
        &completer,
        "We want Grade 3 children in rural Bihar to read fluently. Today most \
         cannot decode simple words. Target: 70% reach 60 words per minute.",
    )
    .expect("live call");
    println!("{patch:?}");
    assert!(patch.problem.is_some());
    assert!(patch.target_outcome.is_some());
}
