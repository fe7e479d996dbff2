//! Guided program-design wizard.
//!
//! `quest run` walks through the six design levels interactively, validating
//! each one against a language model. `quest check` runs a single validation
//! against a saved design, which is handy for scripting.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use quest::core::feedback::FeedbackStatus;
use quest::core::machine::Session;
use quest::core::step::QuestStep;
use quest::exit_codes;
use quest::io::brief::extract_brief;
use quest::io::completion::GeminiCompleter;
use quest::io::config::{QuestConfig, load_config};
use quest::io::export::load_export;
use quest::io::init::{InitOptions, QuestPaths, init_quest};
use quest::io::validator::Validator;
use quest::logging;
use quest::wizard::{WizardConfig, run_wizard};

#[derive(Parser)]
#[command(
    name = "quest",
    version,
    about = "Guided program-design wizard with AI logic checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.quest/config.toml` with defaults if missing.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Start the interactive wizard.
    Run {
        /// Free-text program brief used to pre-fill problem, outcome and theme.
        #[arg(long)]
        brief: Option<String>,
        /// Directory for exported designs (overrides `export_dir`).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate one level of a saved design and print the feedback as JSON.
    Check {
        /// Level to validate: slug (`anchor`), label or number (1-6).
        #[arg(long)]
        step: QuestStep,
        /// Design JSON, as written by `export`.
        record: PathBuf,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let paths = QuestPaths::new(".");
    match cli.command {
        Command::Init { force } => cmd_init(&paths, force),
        Command::Run { brief, out } => cmd_run(&paths, brief.as_deref(), out),
        Command::Check { step, record } => cmd_check(&paths, step, &record),
    }
}

fn cmd_init(paths: &QuestPaths, force: bool) -> Result<i32> {
    let report = init_quest(paths, &InitOptions { force })?;
    for path in &report.created {
        println!("created {}", path.display());
    }
    for path in &report.skipped {
        println!("kept {}", path.display());
    }
    Ok(exit_codes::OK)
}

fn cmd_run(paths: &QuestPaths, brief: Option<&str>, out: Option<PathBuf>) -> Result<i32> {
    let cfg = load_quest_config(paths)?;
    let completer = GeminiCompleter::from_config(&cfg)?;

    let mut session = Session::new();
    if let Some(text) = brief {
        let patch = extract_brief(&completer, text)?;
        info!(?patch, "record pre-filled from brief");
        session.apply_patch(patch);
    }

    let validator = Validator::new(completer)?;
    let config = WizardConfig {
        grace: cfg.grace_delay(),
        export_dir: out.unwrap_or_else(|| cfg.export_dir.clone()),
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let outcome = run_wizard(&mut session, &validator, &config, stdin.lock(), &mut stdout)?;
    stdout.flush().context("flush stdout")?;
    info!(
        quit = outcome.quit,
        step = %outcome.final_step,
        exports = outcome.exports.len(),
        "wizard finished"
    );
    Ok(exit_codes::OK)
}

fn cmd_check(paths: &QuestPaths, step: QuestStep, record: &Path) -> Result<i32> {
    let design = load_export(record)?;
    let cfg = load_quest_config(paths)?;
    let validator = Validator::new(GeminiCompleter::from_config(&cfg)?)?;
    let feedback = validator
        .validate(step, &design)
        .with_context(|| format!("validate {step}"))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&feedback).context("serialize feedback")?
    );
    if feedback.status == FeedbackStatus::Error {
        return Ok(exit_codes::BLOCKED);
    }
    Ok(exit_codes::OK)
}

fn load_quest_config(paths: &QuestPaths) -> Result<QuestConfig> {
    load_config(&paths.config_path)
        .with_context(|| format!("load {}", paths.config_path.display()))
}
