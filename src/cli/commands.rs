//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::changeset::MIN_WAIT_SECS;

/// Stackgate - Change-set-gated CloudFormation deployments.
#[derive(Parser, Debug)]
#[command(name = "stackgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "STACKGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy the stack (creates a change set when change sets are enabled).
    Deploy,

    /// Wait for a change set, show its changes, and execute it.
    ExecuteChangeSet {
        /// Change-set options.
        #[command(flatten)]
        options: ChangeSetArgs,
    },

    /// Wait for a change set and show its changes without executing.
    PrintChangeSet {
        /// Change-set options.
        #[command(flatten)]
        options: ChangeSetArgs,
    },

    /// Validate the deployment configuration.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },
}

/// Options shared by the explicit change-set commands.
#[derive(clap::Args, Debug, Clone)]
pub struct ChangeSetArgs {
    /// Name of the change set to act on.
    #[arg(short = 'n', long)]
    pub change_set_name: Option<String>,

    /// Seconds to wait for the change set to become executable (minimum 90).
    #[arg(long, default_value_t = MIN_WAIT_SECS)]
    pub wait_time: u64,

    /// Wrap the change table at this column width.
    #[arg(long)]
    pub table_width: Option<usize>,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
