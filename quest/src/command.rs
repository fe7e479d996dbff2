//! Parsing of interactive wizard commands.

use anyhow::{Context, Result, anyhow, bail};

use crate::core::record::TextField;

/// Sequence fields that support add/remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Stakeholder,
    Indicator,
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set(TextField, String),
    Theme(String),
    Add(ListField, String),
    /// 1-based position as shown by `show`.
    Remove(ListField, usize),
    /// 1-based stakeholder position and the behavior text.
    Behavior(usize, String),
    Show,
    Next,
    Back,
    Export,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  set problem <text>        set outcome <text>        set methodology <text>
  theme <1-4|text>          add stakeholder <name>    remove stakeholder <n>
  behavior <n> <text>       add indicator <text>      remove indicator <n>
  show    next    back    export    help    quit";

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let (verb, rest) = split_word(line);
    match verb.to_ascii_lowercase().as_str() {
        "set" => {
            let (field, value) = split_word(rest);
            let field = match field.to_ascii_lowercase().as_str() {
                "problem" => TextField::Problem,
                "outcome" => TextField::TargetOutcome,
                "theme" => TextField::Theme,
                "methodology" => TextField::Methodology,
                other => bail!("unknown field '{other}' (problem, outcome, theme, methodology)"),
            };
            Ok(Command::Set(field, require_text(value)?))
        }
        "theme" => Ok(Command::Theme(require_text(rest)?)),
        "add" => {
            let (list, value) = split_word(rest);
            Ok(Command::Add(parse_list(list)?, require_text(value)?))
        }
        "remove" | "rm" => {
            let (list, index) = split_word(rest);
            Ok(Command::Remove(parse_list(list)?, parse_position(index)?))
        }
        "behavior" | "behaviour" => {
            let (index, value) = split_word(rest);
            Ok(Command::Behavior(parse_position(index)?, require_text(value)?))
        }
        "show" => Ok(Command::Show),
        "next" => Ok(Command::Next),
        "back" => Ok(Command::Back),
        "export" => Ok(Command::Export),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err(anyhow!("empty command")),
        other => Err(anyhow!("unknown command '{other}' (try `help`)")),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(at) => (&input[..at], input[at..].trim()),
        None => (input, ""),
    }
}

fn parse_list(word: &str) -> Result<ListField> {
    match word.to_ascii_lowercase().as_str() {
        "stakeholder" | "stakeholders" => Ok(ListField::Stakeholder),
        "indicator" | "indicators" => Ok(ListField::Indicator),
        other => bail!("unknown list '{other}' (stakeholder, indicator)"),
    }
}

fn parse_position(word: &str) -> Result<usize> {
    let position: usize = word
        .parse()
        .with_context(|| format!("expected a number, got '{word}'"))?;
    if position == 0 {
        bail!("positions start at 1");
    }
    Ok(position)
}

fn require_text(value: &str) -> Result<String> {
    if value.is_empty() {
        bail!("missing text");
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_edits() {
        assert_eq!(
            parse_command("set outcome  70% read fluently ").expect("parse"),
            Command::Set(TextField::TargetOutcome, "70% read fluently".to_string())
        );
        assert_eq!(
            parse_command("theme 2").expect("parse"),
            Command::Theme("2".to_string())
        );
    }

    #[test]
    fn parses_list_edits() {
        assert_eq!(
            parse_command("add stakeholder Block Education Officer").expect("parse"),
            Command::Add(ListField::Stakeholder, "Block Education Officer".to_string())
        );
        assert_eq!(
            parse_command("remove indicator 2").expect("parse"),
            Command::Remove(ListField::Indicator, 2)
        );
        assert_eq!(
            parse_command("behavior 1 Uses reading kits daily").expect("parse"),
            Command::Behavior(1, "Uses reading kits daily".to_string())
        );
    }

    #[test]
    fn parses_navigation() {
        assert_eq!(parse_command("NEXT").expect("parse"), Command::Next);
        assert_eq!(parse_command("back").expect("parse"), Command::Back);
        assert_eq!(parse_command("exit").expect("parse"), Command::Quit);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("").is_err());
        assert!(parse_command("set colour blue").is_err());
        assert!(parse_command("add stakeholder").is_err());
        assert!(parse_command("remove stakeholder zero").is_err());
        assert!(parse_command("remove stakeholder 0").is_err());
        assert!(parse_command("jump").is_err());
    }
}
