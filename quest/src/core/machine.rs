//! Quest session state machine.
//!
//! A [`Session`] owns the current step, the record, the latest feedback and
//! the single-flight `pending` flag. Transitions are pure: the validation call
//! and the grace delay live in [`crate::quest`], which drives an advance as
//!
//! ```text
//! begin_advance ──► (validation call) ──► resolve_advance ──► (grace delay) ──► complete_auto_advance
//!                                    └──► fail_advance (force-advance)
//! ```
//!
//! A retreat while a call is in flight bumps the session generation, so the
//! late result is recognised as superseded and discarded.

use thiserror::Error;
use tracing::debug;

use crate::core::feedback::Feedback;
use crate::core::record::{ProgramDesign, RecordPatch};
use crate::core::step::QuestStep;

/// Why an advance request was ignored. No validation call is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdvanceRejected {
    #[error("a validation call is already in flight")]
    Pending,
    #[error("an automatic transition is already scheduled")]
    TransitionScheduled,
    #[error("the quest is already at its final step")]
    Terminal,
}

/// Proof that an advance was started, carrying the record snapshot to validate.
///
/// Edits made after the ticket was issued are not reflected in it. A ticket
/// is consumed by the first `resolve_advance`/`fail_advance` it is given to.
#[derive(Debug)]
pub struct AdvanceTicket {
    generation: u64,
    step: QuestStep,
    record: ProgramDesign,
}

impl AdvanceTicket {
    pub fn step(&self) -> QuestStep {
        self.step
    }

    pub fn record(&self) -> &ProgramDesign {
        &self.record
    }
}

/// What happened when a validation result was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Feedback allows progress; call `complete_auto_advance` after the grace delay.
    Scheduled,
    /// Feedback has status `error`; the user must correct and retry.
    Halted,
    /// The call failed and the step was advanced regardless.
    ForcedAdvance { to: QuestStep },
    /// The ticket was superseded by a retreat, or its advance already resolved.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct Session {
    step: QuestStep,
    record: ProgramDesign,
    pending: bool,
    feedback: Option<Feedback>,
    auto_advance_scheduled: bool,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Anchor step, empty record, idle.
    pub fn new() -> Self {
        Self::with_record(ProgramDesign::default())
    }

    /// Start at Anchor with a pre-filled record.
    pub fn with_record(record: ProgramDesign) -> Self {
        Self {
            step: QuestStep::Anchor,
            record,
            pending: false,
            feedback: None,
            auto_advance_scheduled: false,
            generation: 0,
        }
    }

    pub fn step(&self) -> QuestStep {
        self.step
    }

    pub fn record(&self) -> &ProgramDesign {
        &self.record
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn auto_advance_scheduled(&self) -> bool {
        self.auto_advance_scheduled
    }

    pub fn can_advance(&self) -> bool {
        self.check_advance().is_ok()
    }

    pub fn can_retreat(&self) -> bool {
        !self.step.is_initial()
    }

    /// Merge a field update. Allowed in every state, including while pending.
    pub fn apply_patch(&mut self, patch: RecordPatch) {
        if patch.is_empty() {
            return;
        }
        self.record.merge(patch);
    }

    /// Start an advance: mark pending, clear feedback and snapshot the record.
    pub fn begin_advance(&mut self) -> Result<AdvanceTicket, AdvanceRejected> {
        self.check_advance()?;
        self.pending = true;
        self.feedback = None;
        debug!(step = %self.step, generation = self.generation, "advance started");
        Ok(AdvanceTicket {
            generation: self.generation,
            step: self.step,
            record: self.record.clone(),
        })
    }

    /// Apply the validator's feedback for `ticket`.
    pub fn resolve_advance(&mut self, ticket: AdvanceTicket, feedback: Feedback) -> Resolution {
        if self.is_superseded(&ticket) {
            return Resolution::Discarded;
        }
        self.pending = false;
        let resolution = if feedback.status.allows_advance() {
            self.auto_advance_scheduled = true;
            Resolution::Scheduled
        } else {
            Resolution::Halted
        };
        self.feedback = Some(feedback);
        resolution
    }

    /// Apply a failed validation call for `ticket`: synthesize error feedback
    /// and move forward anyway.
    pub fn fail_advance(&mut self, ticket: AdvanceTicket) -> Resolution {
        if self.is_superseded(&ticket) {
            return Resolution::Discarded;
        }
        self.pending = false;
        self.feedback = Some(Feedback::transport_failure());
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Resolution::ForcedAdvance { to: self.step }
    }

    /// Perform the scheduled transition once the grace delay has elapsed.
    ///
    /// Returns the new step, or `None` when nothing was scheduled (or a
    /// retreat cancelled it).
    pub fn complete_auto_advance(&mut self) -> Option<QuestStep> {
        if !self.auto_advance_scheduled {
            return None;
        }
        self.auto_advance_scheduled = false;
        let next = self.step.next()?;
        self.step = next;
        self.feedback = None;
        debug!(step = %self.step, "auto-advanced");
        Some(next)
    }

    /// Step back one level, resetting pending, feedback and any scheduled advance.
    ///
    /// Returns the new step, or `None` at Anchor (no change).
    pub fn retreat(&mut self) -> Option<QuestStep> {
        let prev = self.step.prev()?;
        self.step = prev;
        self.pending = false;
        self.feedback = None;
        self.auto_advance_scheduled = false;
        self.generation += 1;
        debug!(step = %self.step, generation = self.generation, "retreated");
        Some(prev)
    }

    fn check_advance(&self) -> Result<(), AdvanceRejected> {
        if self.pending {
            return Err(AdvanceRejected::Pending);
        }
        if self.auto_advance_scheduled {
            return Err(AdvanceRejected::TransitionScheduled);
        }
        if self.step.is_terminal() {
            return Err(AdvanceRejected::Terminal);
        }
        Ok(())
    }

    fn is_superseded(&self, ticket: &AdvanceTicket) -> bool {
        if !self.pending {
            debug!(
                ticket_generation = ticket.generation,
                "discarding validation result with no advance in flight"
            );
            return true;
        }
        if ticket.generation != self.generation {
            debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "discarding superseded validation result"
            );
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feedback::{FeedbackStatus, TRANSPORT_FAILURE_MESSAGE};

    fn feedback(status: FeedbackStatus) -> Feedback {
        Feedback::new(status, "msg")
    }

    fn session_at(step: QuestStep) -> Session {
        let mut session = Session::new();
        while session.step() < step {
            let ticket = session.begin_advance().expect("begin");
            session.resolve_advance(ticket, feedback(FeedbackStatus::Valid));
            session.complete_auto_advance().expect("advance");
        }
        session
    }

    #[test]
    fn initial_state_is_idle_anchor() {
        let session = Session::new();
        assert_eq!(session.step(), QuestStep::Anchor);
        assert_eq!(session.record(), &ProgramDesign::default());
        assert!(!session.is_pending());
        assert!(session.feedback().is_none());
    }

    #[test]
    fn begin_advance_sets_pending_and_clears_feedback() {
        let mut session = Session::new();
        let ticket = session.begin_advance().expect("begin");
        session.resolve_advance(ticket, feedback(FeedbackStatus::Error));
        assert!(session.feedback().is_some());

        let ticket = session.begin_advance().expect("begin again");
        assert!(session.is_pending());
        assert!(session.feedback().is_none());
        assert_eq!(ticket.step(), QuestStep::Anchor);
    }

    #[test]
    fn advance_rejected_while_pending() {
        let mut session = Session::new();
        let _ticket = session.begin_advance().expect("begin");
        assert_eq!(
            session.begin_advance().unwrap_err(),
            AdvanceRejected::Pending
        );
    }

    #[test]
    fn advance_rejected_while_transition_scheduled() {
        let mut session = Session::new();
        let ticket = session.begin_advance().expect("begin");
        assert_eq!(
            session.resolve_advance(ticket, feedback(FeedbackStatus::Warning)),
            Resolution::Scheduled
        );
        assert!(!session.is_pending());
        assert_eq!(
            session.begin_advance().unwrap_err(),
            AdvanceRejected::TransitionScheduled
        );
    }

    #[test]
    fn valid_feedback_advances_after_completion() {
        let mut session = Session::new();
        let ticket = session.begin_advance().expect("begin");
        assert_eq!(
            session.resolve_advance(ticket, feedback(FeedbackStatus::Valid)),
            Resolution::Scheduled
        );
        // Feedback stays visible during the grace delay.
        assert_eq!(session.step(), QuestStep::Anchor);
        assert!(session.feedback().is_some());

        assert_eq!(session.complete_auto_advance(), Some(QuestStep::Blueprint));
        assert!(session.feedback().is_none());
        assert_eq!(session.complete_auto_advance(), None);
    }

    #[test]
    fn error_feedback_halts() {
        let mut session = session_at(QuestStep::Shift);
        let ticket = session.begin_advance().expect("begin");
        assert_eq!(
            session.resolve_advance(ticket, feedback(FeedbackStatus::Error)),
            Resolution::Halted
        );
        assert_eq!(session.step(), QuestStep::Shift);
        assert!(!session.is_pending());
        assert_eq!(
            session.feedback().map(|f| f.status),
            Some(FeedbackStatus::Error)
        );
        assert_eq!(session.complete_auto_advance(), None);
    }

    #[test]
    fn failure_force_advances_from_every_step() {
        for start in QuestStep::ALL.into_iter().filter(|s| !s.is_terminal()) {
            let mut session = session_at(start);
            let ticket = session.begin_advance().expect("begin");
            let expected = start.next().expect("next");
            assert_eq!(
                session.fail_advance(ticket),
                Resolution::ForcedAdvance { to: expected }
            );
            assert_eq!(session.step(), expected);
            assert!(!session.is_pending());
            let fb = session.feedback().expect("feedback");
            assert_eq!(fb.status, FeedbackStatus::Error);
            assert_eq!(fb.message, TRANSPORT_FAILURE_MESSAGE);
        }
    }

    #[test]
    fn advance_is_noop_at_export() {
        let mut session = session_at(QuestStep::Export);
        assert_eq!(
            session.begin_advance().unwrap_err(),
            AdvanceRejected::Terminal
        );
        assert!(!session.is_pending());
        assert!(!session.can_advance());
    }

    #[test]
    fn retreat_disabled_at_anchor() {
        let mut session = Session::new();
        assert!(!session.can_retreat());
        assert_eq!(session.retreat(), None);
        assert_eq!(session.step(), QuestStep::Anchor);
    }

    #[test]
    fn retreat_resets_pending_and_feedback() {
        let mut session = session_at(QuestStep::Alliance);
        let ticket = session.begin_advance().expect("begin");
        session.resolve_advance(ticket, feedback(FeedbackStatus::Error));
        let _ticket = session.begin_advance().expect("begin");
        assert!(session.is_pending());

        assert_eq!(session.retreat(), Some(QuestStep::Blueprint));
        assert!(!session.is_pending());
        assert!(session.feedback().is_none());
    }

    #[test]
    fn retreat_cancels_scheduled_advance() {
        let mut session = session_at(QuestStep::Blueprint);
        let ticket = session.begin_advance().expect("begin");
        session.resolve_advance(ticket, feedback(FeedbackStatus::Valid));
        session.retreat();
        assert_eq!(session.complete_auto_advance(), None);
        assert_eq!(session.step(), QuestStep::Anchor);
    }

    #[test]
    fn result_after_retreat_is_discarded() {
        let mut session = session_at(QuestStep::Pulse);
        let ticket = session.begin_advance().expect("begin");
        session.retreat();
        assert_eq!(session.fail_advance(ticket), Resolution::Discarded);
        assert_eq!(session.step(), QuestStep::Shift);
        assert!(session.feedback().is_none());
    }

    #[test]
    fn result_for_finished_advance_is_discarded() {
        let mut session = Session::new();
        let ticket = session.begin_advance().expect("begin");
        let duplicate = AdvanceTicket {
            generation: ticket.generation,
            step: ticket.step,
            record: ticket.record.clone(),
        };
        assert_eq!(
            session.resolve_advance(ticket, feedback(FeedbackStatus::Valid)),
            Resolution::Scheduled
        );
        assert_eq!(session.complete_auto_advance(), Some(QuestStep::Blueprint));

        assert_eq!(session.fail_advance(duplicate), Resolution::Discarded);
        assert_eq!(session.step(), QuestStep::Blueprint);
        assert!(session.feedback().is_none());
        assert!(!session.is_pending());
    }

    #[test]
    fn second_resolution_of_same_advance_is_discarded() {
        let mut session = Session::new();
        let ticket = session.begin_advance().expect("begin");
        let duplicate = AdvanceTicket {
            generation: ticket.generation,
            step: ticket.step,
            record: ticket.record.clone(),
        };
        assert_eq!(
            session.resolve_advance(ticket, feedback(FeedbackStatus::Error)),
            Resolution::Halted
        );
        assert_eq!(
            session.resolve_advance(duplicate, feedback(FeedbackStatus::Valid)),
            Resolution::Discarded
        );
        assert_eq!(session.step(), QuestStep::Anchor);
        assert!(!session.auto_advance_scheduled());
        assert_eq!(
            session.feedback().map(|f| f.status),
            Some(FeedbackStatus::Error)
        );
    }

    #[test]
    fn ticket_snapshot_ignores_later_edits() {
        let mut session = Session::new();
        session.apply_patch(RecordPatch {
            problem: Some("before".to_string()),
            ..RecordPatch::default()
        });
        let ticket = session.begin_advance().expect("begin");
        session.apply_patch(RecordPatch {
            problem: Some("after".to_string()),
            ..RecordPatch::default()
        });
        assert_eq!(ticket.record().problem, "before");
        assert_eq!(session.record().problem, "after");
        assert!(session.is_pending());
    }
}
