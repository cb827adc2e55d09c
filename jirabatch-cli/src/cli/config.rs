//! `jirabatch init` and `jirabatch config`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use jirabatch_core::config::get_config_dirs;
use jirabatch_core::output::{format_path, print_info, print_success};

#[derive(Args, Debug)]
pub struct ConfigArgs {
  /// Jira base URL, e.g. https://company.atlassian.net
  #[arg(long, value_name = "URL")]
  pub host: Option<String>,

  /// Default project key for new issues
  #[arg(long, value_name = "KEY")]
  pub project: Option<String>,

  /// Directory holding certificate files
  #[arg(long, value_name = "DIR")]
  pub cert_dir: Option<PathBuf>,

  /// Custom field id for story points, e.g. customfield_10016
  #[arg(long, value_name = "FIELD")]
  pub story_points_field: Option<String>,
}

impl ConfigArgs {
  const fn has_updates(&self) -> bool {
    self.host.is_some() || self.project.is_some() || self.cert_dir.is_some() || self.story_points_field.is_some()
  }
}

pub fn handle_init_command() -> Result<()> {
  let config_dirs = get_config_dirs()?;
  let path = config_dirs.config_path().display().to_string();

  if config_dirs.init()? {
    print_success(&format!("Wrote default configuration to {}", format_path(&path)));
  } else {
    print_info(&format!("Configuration already exists at {}", format_path(&path)));
  }
  Ok(())
}

pub fn handle_config_command(args: &ConfigArgs) -> Result<()> {
  let config_dirs = get_config_dirs()?;
  let path = config_dirs.config_path();

  if args.has_updates() {
    let mut config = config_dirs.load_config()?;
    if let Some(host) = &args.host {
      config.jira.host = Some(host.clone());
    }
    if let Some(project) = &args.project {
      config.jira.project = Some(project.clone());
    }
    if let Some(dir) = &args.cert_dir {
      config.attachments.cert_dir = Some(dir.clone());
    }
    if let Some(field) = &args.story_points_field {
      config.jira.story_points_field = Some(field.clone());
    }
    config.save(&path)?;
    print_success(&format!("Updated {}", format_path(&path.display().to_string())));
    return Ok(());
  }

  let mut config = config_dirs.load_config()?;
  config.apply_env();
  let content = toml::to_string_pretty(&config).context("Failed to serialize config to TOML")?;

  print_info(&format!(
    "Effective configuration ({} plus environment):",
    format_path(&path.display().to_string())
  ));
  println!("{content}");
  Ok(())
}
