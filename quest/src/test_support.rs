//! Test-only helpers: scripted completers and record fixtures.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::core::feedback::{Feedback, FeedbackStatus};
use crate::core::record::{PracticeChange, ProgramDesign};
use crate::io::completion::{Completer, CompletionRequest};

/// Completer that replays queued replies (or failures) and records requests.
pub struct ScriptedCompleter {
    script: RefCell<VecDeque<Result<String, String>>>,
    requests: RefCell<Vec<CompletionRequest>>,
}

impl ScriptedCompleter {
    pub fn new(script: Vec<Result<String, String>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Every call succeeds with the next reply text.
    pub fn replies(replies: Vec<String>) -> Self {
        Self::new(replies.into_iter().map(Ok).collect())
    }

    /// Every call fails with the next message.
    pub fn failures(messages: Vec<&str>) -> Self {
        Self::new(messages.into_iter().map(|m| Err(m.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.borrow().len()
    }
}

impl Completer for ScriptedCompleter {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.borrow_mut().push(request.clone());
        match self.script.borrow_mut().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted completer exhausted")),
        }
    }
}

/// Serialized feedback reply with the given status.
pub fn reply(status: FeedbackStatus, message: &str) -> String {
    serde_json::to_string(&Feedback::new(status, message)).expect("serialize feedback")
}

pub fn valid_reply(message: &str) -> String {
    reply(FeedbackStatus::Valid, message)
}

/// A fully filled-in literacy program design.
pub fn sample_design() -> ProgramDesign {
    ProgramDesign {
        problem: "Grade 3 students in rural schools lack basic literacy skills".to_string(),
        target_outcome: "70% of students achieve grade-appropriate reading fluency".to_string(),
        theme: "FLN".to_string(),
        methodology: "In-service teacher training and contextualized learning kits".to_string(),
        stakeholders: vec!["Teacher".to_string(), "CRP".to_string()],
        practice_changes: vec![
            PracticeChange {
                stakeholder: "Teacher".to_string(),
                behavior: "Runs 30 minutes of guided reading daily".to_string(),
            },
            PracticeChange {
                stakeholder: "CRP".to_string(),
                behavior: "Observes two classrooms per week with a checklist".to_string(),
            },
        ],
        indicators: vec!["% of teachers using ORF tools correctly".to_string()],
    }
}

/// Temporary project root for filesystem tests.
pub fn temp_root() -> Result<tempfile::TempDir> {
    Ok(tempfile::tempdir()?)
}
