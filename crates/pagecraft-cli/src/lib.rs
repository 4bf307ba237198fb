//! Command-line host for the Pagecraft layout engine.
//!
//! Reads snapshots and command batches as JSON files and writes results as
//! JSON to stdout.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use pagecraft_core::domain::invariants::{ensure_valid, validate};
use pagecraft_core::domain::template::default_template;
use pagecraft_core::{CommandProcessor, EngineConfig, LayoutCommand, LayoutSnapshot, PageType};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a command batch and print the batch outcome
    Apply {
        /// JSON file holding an array of commands
        #[arg(long)]
        commands: PathBuf,

        /// JSON snapshot to start from
        #[arg(long, conflicts_with = "page_type")]
        snapshot: Option<PathBuf>,

        /// Start from the default template for this page type
        #[arg(long)]
        page_type: Option<PageType>,
    },

    /// Print the default template for a page type
    Template {
        page_type: PageType,
    },

    /// Check a snapshot file against the tree invariants
    Validate {
        snapshot: PathBuf,
    },
}

/// Run one CLI command and return the JSON it prints
pub fn run(cli: Cli, config: &EngineConfig) -> Result<Value> {
    match cli.command {
        Commands::Apply {
            commands,
            snapshot,
            page_type,
        } => {
            let tree = match (snapshot, page_type) {
                (Some(path), _) => read_snapshot(&path)?,
                (None, Some(page_type)) => default_template(&page_type)
                    .with_context(|| format!("No template for page type {}", page_type))?,
                (None, None) => bail!("Either --snapshot or --page-type is required"),
            };
            let commands = read_commands(&commands)?;

            let outcome = CommandProcessor::new(config)
                .execute(&commands, &tree)
                .context("Command batch rejected")?;
            info!(
                executed = outcome.executed_count,
                failed = outcome.errors.len(),
                "Batch finished"
            );
            serde_json::to_value(&outcome).context("Failed to encode batch outcome")
        }
        Commands::Template { page_type } => {
            let tree = default_template(&page_type)
                .with_context(|| format!("No template for page type {}", page_type))?;
            serde_json::to_value(&tree).context("Failed to encode template")
        }
        Commands::Validate { snapshot } => {
            let text = fs::read_to_string(&snapshot)
                .with_context(|| format!("Failed to read {}", snapshot.display()))?;
            let tree = serde_json::from_str::<LayoutSnapshot>(&text)
                .with_context(|| format!("Failed to parse {}", snapshot.display()))?;

            let violations: Vec<String> = match validate(&tree) {
                Ok(()) => Vec::new(),
                Err(found) => found.iter().map(ToString::to_string).collect(),
            };
            debug!(count = violations.len(), "Snapshot validated");
            Ok(serde_json::json!({
                "valid": violations.is_empty(),
                "violations": violations,
            }))
        }
    }
}

fn read_snapshot(path: &Path) -> Result<LayoutSnapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let tree: LayoutSnapshot = serde_json::from_str(&text)
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;
    ensure_valid(&tree)
        .with_context(|| format!("Snapshot {} breaks tree invariants", path.display()))?;
    Ok(tree)
}

fn read_commands(path: &Path) -> Result<Vec<LayoutCommand>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read commands {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid commands {}", path.display()))
}
