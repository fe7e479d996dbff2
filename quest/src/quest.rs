//! Orchestration for a single `next` request.
//!
//! Pairs the pure [`Session`] transitions with the validation round-trip and
//! the grace delay that keeps positive feedback on screen before moving on.

use std::thread;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::core::feedback::Feedback;
use crate::core::machine::{AdvanceRejected, Resolution, Session};
use crate::core::step::QuestStep;
use crate::io::completion::Completer;
use crate::io::validator::Validator;

/// Result of one advance request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Step the request was issued from.
    pub from: QuestStep,
    /// How the validation result was applied.
    pub resolution: Resolution,
    /// Feedback shown for this request (before any auto-advance cleared it).
    pub feedback: Option<Feedback>,
    /// Step after the request completed.
    pub step: QuestStep,
}

/// Validate the current step and move on when the feedback allows it.
///
/// `on_resolved` runs once the feedback is known and before the grace delay,
/// so a front end can show it. A transport failure never blocks progress: the
/// step is advanced with synthesized error feedback.
#[instrument(skip_all, fields(step = %session.step()))]
pub fn run_advance<C: Completer, F: FnMut(&Session, Resolution)>(
    session: &mut Session,
    validator: &Validator<C>,
    grace: Duration,
    mut on_resolved: F,
) -> Result<AdvanceOutcome, AdvanceRejected> {
    let from = session.step();
    let ticket = session.begin_advance()?;

    let resolution = match validator.validate(ticket.step(), ticket.record()) {
        Ok(feedback) => {
            info!(status = ?feedback.status, "validation feedback received");
            session.resolve_advance(ticket, feedback)
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "validation call failed, advancing anyway");
            session.fail_advance(ticket)
        }
    };
    let feedback = session.feedback().cloned();
    on_resolved(session, resolution);

    if resolution == Resolution::Scheduled {
        if !grace.is_zero() {
            thread::sleep(grace);
        }
        session.complete_auto_advance();
    }

    Ok(AdvanceOutcome {
        from,
        resolution,
        feedback,
        step: session.step(),
    })
}
