//! Stackgate CLI entrypoint.
//!
//! This is the main entrypoint for the stackgate command-line tool.

use std::path::PathBuf;
use std::process::ExitCode;

use stackgate::changeset::{effective_wait_secs, ChangeSetController, ChangeSetRunOptions};
use stackgate::cli::{ChangeSetArgs, Cli, Commands};
use stackgate::cloudformation::CloudFormationClient;
use stackgate::config::{find_config_file, ConfigParser, ConfigValidator, DeployConfig};
use stackgate::deploy::{DeployGate, DeployPipeline, DirectDeployEngine, ProviderFlags};
use stackgate::error::Result;

use clap::Parser;
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red());
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Deploy => cmd_deploy(cli.config.as_ref()).await,
        Commands::ExecuteChangeSet { options } => {
            cmd_change_set(cli.config.as_ref(), &options, true).await
        }
        Commands::PrintChangeSet { options } => {
            cmd_change_set(cli.config.as_ref(), &options, false).await
        }
        Commands::Validate { warnings } => cmd_validate(cli.config.as_ref(), warnings),
    }
}

/// Deploy the stack, gated behind a change set when enabled.
async fn cmd_deploy(config_path: Option<&PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let client = CloudFormationClient::new(config.project.region.as_deref()).await;

    let controller = ChangeSetController::new(client.clone(), config.stack_settings());
    let engine = DirectDeployEngine::new(client);
    let pipeline = DeployPipeline::new(engine, config.stack_settings());

    let mut gate = DeployGate::new(
        config.change_sets_enabled(),
        config.configured_change_set_name().map(String::from),
    );
    let mut flags = ProviderFlags::default();

    let outcome = pipeline.run(&mut gate, &mut flags, &controller).await?;

    if let Some(name) = outcome.change_set_name {
        eprintln!(
            "{} Change set [{name}] created for stack [{}].",
            "✓".green(),
            config.stack_name()
        );
        eprintln!("Run 'stackgate execute-change-set' to apply it.");
    } else if outcome.applied {
        eprintln!(
            "{} Stack [{}] deployed.",
            "✓".green(),
            config.stack_name()
        );
    }

    Ok(())
}

/// Wait for a change set, present it, and optionally execute it.
async fn cmd_change_set(
    config_path: Option<&PathBuf>,
    args: &ChangeSetArgs,
    execute: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let client = CloudFormationClient::new(config.project.region.as_deref()).await;
    let controller = ChangeSetController::new(client, config.stack_settings());

    // A name pinned in the configuration wins over the CLI flag.
    let name = config
        .configured_change_set_name()
        .map(String::from)
        .or_else(|| args.change_set_name.clone());

    let options = ChangeSetRunOptions {
        change_set_name: name,
        wait_secs: effective_wait_secs(args.wait_time),
        table_width: args.table_width,
    };

    // The change table goes to stdout so it can be piped; status lines stay
    // on stderr.
    let mut out = std::io::stdout();
    if execute {
        controller.execute_change_set(&options, &mut out).await?;
        eprintln!("{} Change set execution started.", "✓".green());
    } else {
        controller.print_change_set(&options, &mut out).await?;
    }

    Ok(())
}

/// Validate configuration.
fn cmd_validate(config_path: Option<&PathBuf>, show_warnings: bool) -> Result<()> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Validating configuration: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(
        config_file
            .parent()
            .unwrap_or_else(|| std::path::Path::new(".")),
    );
    parser.load_dotenv()?;

    let config = parser.load_file(&config_file)?;

    let validator = ConfigValidator::new();
    let result = validator.validate(&config)?;

    if result.is_valid() {
        eprintln!("{} Configuration is valid!", "✓".green());
        if show_warnings && !result.warnings.is_empty() {
            eprintln!("\n{}", "Warnings:".yellow());
            for warning in &result.warnings {
                eprintln!("  - {warning}");
            }
        }
    }

    // Show summary
    eprintln!("\nConfiguration summary:");
    eprintln!("  Project: {}", config.project.name);
    eprintln!("  Stage: {}", config.project.stage);
    eprintln!("  Stack: {}", config.stack_name());
    eprintln!("  Template: {}", config.stack.template_url);
    eprintln!(
        "  Change sets: {}",
        if config.change_sets_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Loads, env-overrides, and validates the configuration.
fn load_config(config_path: Option<&PathBuf>) -> Result<DeployConfig> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading configuration from: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(
        config_file
            .parent()
            .unwrap_or_else(|| std::path::Path::new(".")),
    );
    parser.load_dotenv()?;

    let config = parser.load_with_env(&config_file)?;

    let validator = ConfigValidator::new();
    validator.validate(&config)?;

    Ok(config)
}
