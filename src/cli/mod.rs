//! CLI module for the stackgate deployment tool.
//!
//! This module provides the command-line interface for change-set-gated
//! CloudFormation deployments.

mod commands;

pub use commands::{ChangeSetArgs, Cli, Commands};
