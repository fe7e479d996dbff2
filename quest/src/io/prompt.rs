//! Prompt rendering for validation and brief extraction.
//!
//! Each step surfaces a different slice of the record; the judgement itself is
//! left to the model.

use anyhow::Result;
use minijinja::{Environment, context};

use crate::core::record::ProgramDesign;
use crate::core::step::QuestStep;

const CONTRACT_TEMPLATE: &str = include_str!("prompts/contract.md");
const ANCHOR_TEMPLATE: &str = include_str!("prompts/anchor.md");
const BLUEPRINT_TEMPLATE: &str = include_str!("prompts/blueprint.md");
const ALLIANCE_TEMPLATE: &str = include_str!("prompts/alliance.md");
const SHIFT_TEMPLATE: &str = include_str!("prompts/shift.md");
const PULSE_TEMPLATE: &str = include_str!("prompts/pulse.md");
const EXPORT_TEMPLATE: &str = include_str!("prompts/export.md");
const BRIEF_TEMPLATE: &str = include_str!("prompts/brief.md");

/// Template engine wrapper around minijinja.
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        let mut env = Environment::new();
        for (name, source) in [
            ("contract", CONTRACT_TEMPLATE),
            ("anchor", ANCHOR_TEMPLATE),
            ("blueprint", BLUEPRINT_TEMPLATE),
            ("alliance", ALLIANCE_TEMPLATE),
            ("shift", SHIFT_TEMPLATE),
            ("pulse", PULSE_TEMPLATE),
            ("export", EXPORT_TEMPLATE),
            ("brief", BRIEF_TEMPLATE),
        ] {
            env.add_template(name, source)
                .expect("embedded prompt template should be valid");
        }
        Self { env }
    }

    /// Render the validation prompt for `step` from the relevant record fields.
    pub fn build_validation(&self, step: QuestStep, record: &ProgramDesign) -> Result<String> {
        let ctx = match step {
            QuestStep::Anchor => context! {
                problem => record.problem.trim(),
                outcome => record.target_outcome.trim(),
            },
            QuestStep::Blueprint => context! {
                theme => record.theme.trim(),
                methodology => record.methodology.trim(),
                problem => record.problem.trim(),
            },
            QuestStep::Alliance => context! {
                stakeholders => &record.stakeholders,
                methodology => record.methodology.trim(),
            },
            QuestStep::Shift => context! {
                changes => &record.practice_changes,
            },
            QuestStep::Pulse => context! {
                outcome => record.target_outcome.trim(),
                stakeholders => &record.stakeholders,
                theme => record.theme.trim(),
            },
            QuestStep::Export => context! {
                record => record,
            },
        };
        let template = self.env.get_template(step.slug())?;
        Ok(template.render(ctx)?.trim().to_string())
    }

    /// Render the prompt that pulls record fields out of a free-text brief.
    pub fn build_brief(&self, text: &str) -> Result<String> {
        let template = self.env.get_template("brief")?;
        Ok(template.render(context! { text => text.trim() })?.trim().to_string())
    }
}
