//! Line-oriented front end for `quest run`.
//!
//! Reads one [`Command`] per line, routes field edits through the collector,
//! and drives `next`/`back` through [`crate::quest::run_advance`]. Input and
//! output are generic so the loop can be scripted in tests.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info};

use crate::command::{Command, HELP, ListField, parse_command};
use crate::core::collector;
use crate::core::feedback::Feedback;
use crate::core::machine::{Resolution, Session};
use crate::core::record::{ProgramDesign, RecordPatch, THEMES, TextField};
use crate::core::step::QuestStep;
use crate::io::completion::Completer;
use crate::io::export::{export_date, export_record, render_summary};
use crate::io::validator::Validator;
use crate::quest::run_advance;

/// Settings for one interactive session.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Pause between positive feedback and the automatic step change.
    pub grace: Duration,
    pub export_dir: PathBuf,
}

/// How the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardOutcome {
    /// `true` on `quit`, `false` when input ran out.
    pub quit: bool,
    pub final_step: QuestStep,
    /// Every file written by `export`, in order.
    pub exports: Vec<PathBuf>,
}

/// Run the wizard until `quit` or end of input.
pub fn run_wizard<C: Completer, R: BufRead, W: Write>(
    session: &mut Session,
    validator: &Validator<C>,
    config: &WizardConfig,
    input: R,
    out: &mut W,
) -> Result<WizardOutcome> {
    let mut exports = Vec::new();
    render_step(out, session)?;

    let mut lines = input.lines();
    let quit = loop {
        write!(out, "{}> ", session.step())?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break false;
        };
        let line = line.context("read command")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(out, "error: {err:#}")?;
                continue;
            }
        };
        debug!(?command, step = %session.step(), "command");

        match command {
            Command::Quit => break true,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Show => render_step(out, session)?,
            Command::Next => advance(session, validator, config.grace, out)?,
            Command::Back => match session.retreat() {
                Some(_) => render_step(out, session)?,
                None => writeln!(out, "Already at the first level.")?,
            },
            Command::Export => match export(session, config) {
                Ok(path) => {
                    writeln!(out, "Exported {}", path.display())?;
                    exports.push(path);
                }
                Err(err) => writeln!(out, "error: {err:#}")?,
            },
            edit => match edit_patch(session, edit) {
                Ok(Some(patch)) => {
                    session.apply_patch(patch);
                    render_step(out, session)?;
                }
                Ok(None) => writeln!(out, "Nothing changed.")?,
                Err(err) => writeln!(out, "error: {err:#}")?,
            },
        }
    };

    Ok(WizardOutcome {
        quit,
        final_step: session.step(),
        exports,
    })
}

fn advance<C: Completer, W: Write>(
    session: &mut Session,
    validator: &Validator<C>,
    grace: Duration,
    out: &mut W,
) -> Result<()> {
    let mut render_error = None;
    let outcome = run_advance(session, validator, grace, |session, resolution| {
        let Some(feedback) = session.feedback() else {
            return;
        };
        let mut rendered = render_feedback(out, feedback);
        if rendered.is_ok() && resolution == Resolution::Halted {
            rendered = writeln!(out, "Fix the points above and try `next` again.");
        }
        if let Err(err) = rendered {
            render_error = Some(err);
        }
    });
    if let Some(err) = render_error {
        return Err(err).context("write feedback");
    }

    match outcome {
        Ok(outcome) if outcome.step != outcome.from => render_step(out, session),
        Ok(_) => Ok(()),
        Err(rejected) => {
            writeln!(out, "Cannot advance: {rejected}.")?;
            Ok(())
        }
    }
}

fn export(session: &Session, config: &WizardConfig) -> Result<PathBuf> {
    if !session.step().is_terminal() {
        bail!(
            "export is available once the quest is complete (currently at {})",
            session.step().title()
        );
    }
    let path = export_record(&config.export_dir, session.record(), export_date())?;
    info!(path = %path.display(), "exported from wizard");
    Ok(path)
}

/// Turn a field command into a patch, enforcing that edits target the
/// current step's form.
fn edit_patch(session: &Session, command: Command) -> Result<Option<RecordPatch>> {
    let step = session.step();
    let record = session.record();
    match command {
        Command::Set(field, value) => {
            require_step(step, collector::owning_step(field))
                .with_context(|| format!("cannot set {}", field.label()))?;
            if field == TextField::Theme {
                return collector::set_theme(&value).map(Some);
            }
            Ok(Some(collector::set_text(field, &value)))
        }
        Command::Theme(choice) => {
            require_step(step, QuestStep::Blueprint)?;
            collector::set_theme(&choice).map(Some)
        }
        Command::Add(ListField::Stakeholder, label) => {
            require_step(step, QuestStep::Alliance)?;
            Ok(collector::add_stakeholder(record, &label))
        }
        Command::Remove(ListField::Stakeholder, position) => {
            require_step(step, QuestStep::Alliance)?;
            collector::remove_stakeholder(record, position - 1).map(Some)
        }
        Command::Behavior(position, behavior) => {
            require_step(step, QuestStep::Shift)?;
            let stakeholder = record.stakeholders.get(position - 1).ok_or_else(|| {
                anyhow!(
                    "no stakeholder #{position} (there are {})",
                    record.stakeholders.len()
                )
            })?;
            collector::set_behavior(record, stakeholder, &behavior).map(Some)
        }
        Command::Add(ListField::Indicator, indicator) => {
            require_step(step, QuestStep::Pulse)?;
            Ok(collector::add_indicator(record, &indicator))
        }
        Command::Remove(ListField::Indicator, position) => {
            require_step(step, QuestStep::Pulse)?;
            collector::remove_indicator(record, position - 1).map(Some)
        }
        other => bail!("{other:?} is not a field edit"),
    }
}

fn require_step(current: QuestStep, owner: QuestStep) -> Result<()> {
    if current != owner {
        bail!(
            "that field belongs to Level {} ({}); you are at {}",
            owner.number(),
            owner.title(),
            current.title()
        );
    }
    Ok(())
}

/// Print the step header and the data its form holds.
pub fn render_step<W: Write>(out: &mut W, session: &Session) -> Result<()> {
    let step = session.step();
    let record = session.record();
    writeln!(out)?;
    if step.is_terminal() {
        writeln!(out, "== {} ==", step.title())?;
    } else {
        writeln!(out, "== Level {}: {} ==", step.number(), step.title())?;
    }
    writeln!(out, "{}", step.brief())?;

    match step {
        QuestStep::Anchor => {
            render_fields(out, record, &[TextField::Problem, TextField::TargetOutcome])?;
        }
        QuestStep::Blueprint => {
            let themes: Vec<String> = THEMES
                .iter()
                .enumerate()
                .map(|(i, theme)| format!("{}. {theme}", i + 1))
                .collect();
            writeln!(out, "  Themes: {}", themes.join("  "))?;
            render_fields(out, record, &[TextField::Theme, TextField::Methodology])?;
        }
        QuestStep::Alliance => {
            if record.stakeholders.is_empty() {
                writeln!(out, "  (no stakeholders yet)")?;
            }
            for (i, stakeholder) in record.stakeholders.iter().enumerate() {
                writeln!(out, "  {}. {stakeholder}", i + 1)?;
            }
        }
        QuestStep::Shift => {
            if record.stakeholders.is_empty() {
                writeln!(out, "  (map stakeholders at Level 3 first)")?;
            }
            for (i, stakeholder) in record.stakeholders.iter().enumerate() {
                let behavior = record.behavior_for(stakeholder).unwrap_or("");
                writeln!(out, "  {}. {stakeholder}: {}", i + 1, or_blank(behavior))?;
            }
        }
        QuestStep::Pulse => {
            if record.indicators.is_empty() {
                writeln!(out, "  (no indicators yet)")?;
            }
            for (i, indicator) in record.indicators.iter().enumerate() {
                writeln!(out, "  {}. {indicator}", i + 1)?;
            }
        }
        QuestStep::Export => {
            write!(out, "{}", render_summary(record))?;
            writeln!(out, "Type `export` to save the design as JSON.")?;
        }
    }

    let mut moves = Vec::new();
    if session.can_retreat() {
        moves.push("back");
    }
    if session.can_advance() {
        moves.push("next");
    }
    if !moves.is_empty() {
        writeln!(out, "  ({})", moves.join(" | "))?;
    }
    Ok(())
}

fn render_fields<W: Write>(out: &mut W, record: &ProgramDesign, fields: &[TextField]) -> Result<()> {
    for &field in fields {
        writeln!(out, "  {}: {}", field.label(), or_blank(record.text(field)))?;
    }
    Ok(())
}

fn render_feedback<W: Write>(out: &mut W, feedback: &Feedback) -> std::io::Result<()> {
    writeln!(out, "[{}] {}", feedback.status.headline(), feedback.message)?;
    if feedback.logic_break {
        writeln!(out, "  Critical: this breaks the chain from practice to outcome.")?;
    }
    for suggestion in &feedback.suggestions {
        writeln!(out, "  - {suggestion}")?;
    }
    Ok(())
}

fn or_blank(value: &str) -> &str {
    if value.is_empty() { "(blank)" } else { value }
}
