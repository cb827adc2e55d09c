//! # Command Line Interface
//!
//! Defines the CLI structure and command handlers for jirabatch.

mod apply;
mod check;
mod config;
mod validate;

use std::process::ExitCode;

use anyhow::Result;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, Parser, Subcommand};
use jirabatch_core::output::ColorMode;

/// Top-level CLI command for jirabatch
#[derive(Parser)]
#[command(name = "jirabatch")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(about = "Batch-apply Jira issue creations and updates from JSON")]
#[command(
  long_about = "jirabatch reads a JSON array of records and applies each one to Jira Cloud.\n\n\
        Records with an `issue` key update that issue (status, comment, labels, story\n\
        points, certificate attachment). Records with an `issuetype` create a new issue.\n\
        Records are applied one at a time, in order; a bad record never stops the run."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
#[command(subcommand_required(true))]
#[command(disable_help_subcommand = true)]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count,
    global = true,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show info level messages\n\
             -vv: Show debug level messages\n\
             -vvv: Show trace level messages"
  )]
  pub verbose: u8,

  /// Controls when colored output is used
  #[arg(
    long,
    value_enum,
    ignore_case = true,
    global = true,
    default_value_t = ColorMode::Auto,
  )]
  pub colors: ColorMode,

  /// Subcommands
  #[command(subcommand)]
  pub command: Commands,
}

/// Subcommands for jirabatch
#[derive(Subcommand)]
pub enum Commands {
  /// Apply a JSON definition file to Jira
  #[command(long_about = "Apply every record in a JSON definition file to Jira.\n\n\
            Each record is validated, mapped to Jira operations and executed in order.\n\
            A record stops at its first failed operation; the next record always runs.\n\
            After creating issues, a follow-up update file is written next to the input\n\
            so the new issues can be moved on with a second `apply`.\n\n\
            Exits with status 1 unless every record succeeded.")]
  Apply(apply::ApplyArgs),

  /// Check credentials against Jira
  #[command(long_about = "Verify that the configured Jira host and credentials work.\n\n\
            Credentials are read from .netrc (machine = Jira host, then atlassian.net)\n\
            or from the JIRA_EMAIL and JIRA_API_TOKEN environment variables.")]
  Check,

  /// Show or change configuration
  #[command(long_about = "Show the effective configuration or update config.toml.\n\n\
            Without options the effective configuration (file plus environment) is shown.")]
  Config(config::ConfigArgs),

  /// Write a default configuration file
  #[command(long_about = "Writes a default config.toml to the jirabatch configuration directory.\n\n\
            An existing file is left untouched. No credentials are required.")]
  Init,

  /// Validate a definition file without contacting Jira
  #[command(long_about = "Validate and map every record without making any network request.\n\n\
            Prints the operations each record would produce, including resolved\n\
            certificate files. Exits with status 1 if any record would be rejected\n\
            or cannot be mapped.")]
  Validate(validate::ValidateArgs),
}

pub fn handle_cli(cli: Cli) -> Result<ExitCode> {
  // Set global color override based on --colors argument
  match cli.colors {
    ColorMode::Always | ColorMode::Yes => owo_colors::set_override(true),
    ColorMode::Never | ColorMode::No => owo_colors::set_override(false),
    ColorMode::Auto => {
      // Let owo_colors use its default auto-detection
    }
  }

  match cli.command {
    Commands::Apply(args) => apply::handle_apply_command(&args),
    Commands::Check => check::handle_check_command().map(|()| ExitCode::SUCCESS),
    Commands::Config(args) => config::handle_config_command(&args).map(|()| ExitCode::SUCCESS),
    Commands::Init => config::handle_init_command().map(|()| ExitCode::SUCCESS),
    Commands::Validate(args) => validate::handle_validate_command(&args),
  }
}

/// Flags shared by `apply` and `validate`
#[derive(clap::Args, Debug, Clone)]
pub struct BatchArgs {
  /// JSON file containing an array of records
  #[arg(required = true, index = 1)]
  pub file: std::path::PathBuf,

  /// Directory holding certificate files named `{category}_{severity}.pdf`
  #[arg(long, value_name = "DIR")]
  pub cert_dir: Option<std::path::PathBuf>,

  /// Project key for new issues (default: inferred from the epic)
  #[arg(long, value_name = "KEY")]
  pub project: Option<String>,

  /// Assign every updated issue to yourself
  #[arg(long)]
  pub assign_self: bool,
}

impl BatchArgs {
  pub fn overrides(&self) -> crate::settings::Overrides {
    crate::settings::Overrides {
      cert_dir: self.cert_dir.clone(),
      project: self.project.clone(),
      assign_self: self.assign_self,
    }
  }
}
