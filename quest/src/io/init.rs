//! Initialization helpers for `.quest/` scaffolding.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use super::config::{QuestConfig, write_config};

/// All canonical paths within `.quest/` for a project root.
#[derive(Debug, Clone)]
pub struct QuestPaths {
    pub root: PathBuf,
    pub quest_dir: PathBuf,
    pub config_path: PathBuf,
    pub gitignore_path: PathBuf,
}

impl QuestPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let quest_dir = root.join(".quest");
        Self {
            root,
            config_path: quest_dir.join("config.toml"),
            gitignore_path: quest_dir.join(".gitignore"),
            quest_dir,
        }
    }
}

/// Options for `init_quest`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite existing quest-owned files.
    pub force: bool,
}

/// Summary of an init run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub created: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Create `.quest/config.toml` (defaults) and `.quest/.gitignore`.
pub fn init_quest(paths: &QuestPaths, options: &InitOptions) -> Result<InitReport> {
    fs::create_dir_all(&paths.quest_dir)
        .with_context(|| format!("create {}", paths.quest_dir.display()))?;

    let mut report = InitReport {
        created: Vec::new(),
        skipped: Vec::new(),
    };

    if options.force || !paths.config_path.exists() {
        write_config(&paths.config_path, &QuestConfig::default())?;
        report.created.push(paths.config_path.clone());
    } else {
        report.skipped.push(paths.config_path.clone());
    }

    if options.force || !paths.gitignore_path.exists() {
        fs::write(&paths.gitignore_path, "*.tmp\n")
            .with_context(|| format!("write {}", paths.gitignore_path.display()))?;
        report.created.push(paths.gitignore_path.clone());
    } else {
        report.skipped.push(paths.gitignore_path.clone());
    }

    info!(created = report.created.len(), skipped = report.skipped.len(), "quest initialized");
    Ok(report)
}
