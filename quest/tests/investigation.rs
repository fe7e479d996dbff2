//! Investigation tests for the live Gemini endpoint.
//!
//! These tests call the real model and are excluded from regular CI runs
//! because they need network access and an API key.
//!
//! Run with: `GEMINI_API_KEY=... cargo test -p quest --test investigation -- --ignored`

#[path = "investigation/gemini.rs"]
mod gemini;
