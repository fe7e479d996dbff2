//! Guided program-design wizard with model-backed validation.
//!
//! A quest walks a user through six levels of a Logical Framework design
//! (problem and outcome, theme and methodology, stakeholders, practice
//! changes, indicators, export). Each advance sends the accumulated record to
//! a language model and only moves on when the feedback allows it.
//!
//! - **[`core`]**: Pure, deterministic logic (record, steps, feedback, the
//!   session state machine, input collection). No I/O.
//! - **[`io`]**: Side-effecting operations (config, HTTP completion, prompts,
//!   schema checks, export). Isolated behind the [`io::completion::Completer`]
//!   trait so tests can script the model.
//!
//! Orchestration modules ([`quest`], [`wizard`]) coordinate core logic with I/O
//! to implement CLI commands.

pub mod command;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod quest;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod wizard;
