//! Effective settings for one invocation: command-line flags layered over
//! the environment, `config.toml` and defaults.

use std::path::PathBuf;

use anyhow::Result;
use jirabatch_core::attachment::CertificateDirResolver;
use jirabatch_core::config::{BatchConfig, get_config_dirs};
use jirabatch_core::mapper::MapperOptions;
use serde_json::Value;

/// Flags shared by `apply` and `validate`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub cert_dir: Option<PathBuf>,
  pub project: Option<String>,
  pub assign_self: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
  pub host: Option<String>,
  pub project: Option<String>,
  pub story_points_field: Option<String>,
  pub cert_dir: Option<PathBuf>,
  pub extensions: Vec<String>,
  pub assign_self: bool,
  pub write_followup: bool,
  pub followup_status: String,
}

impl Settings {
  /// Load `config.toml`, overlay the environment, then the flags.
  pub fn load(overrides: &Overrides) -> Result<Self> {
    let mut config = get_config_dirs()?.load_config()?;
    config.apply_env();
    Ok(Self::resolve(config, overrides))
  }

  pub fn resolve(config: BatchConfig, overrides: &Overrides) -> Self {
    Self {
      host: config.jira.host,
      project: overrides.project.clone().or(config.jira.project),
      story_points_field: config.jira.story_points_field,
      cert_dir: overrides.cert_dir.clone().or(config.attachments.cert_dir),
      extensions: config.attachments.extensions,
      assign_self: overrides.assign_self || config.apply.assign_self,
      write_followup: config.apply.write_followup,
      followup_status: config.apply.followup_status,
    }
  }

  pub fn mapper_options(&self) -> MapperOptions {
    MapperOptions {
      project: self.project.clone(),
      assign_self: self.assign_self,
    }
  }

  /// Resolver for the certificate directory, checked up front when any
  /// record could need it.
  pub fn resolver(&self, records: &[Value]) -> Result<Option<CertificateDirResolver>> {
    let Some(dir) = &self.cert_dir else {
      return Ok(None);
    };

    let resolver = CertificateDirResolver::new(dir, &self.extensions);
    if records_need_attachments(records) {
      resolver.check_dir()?;
    }
    Ok(Some(resolver))
  }
}

/// True when any record names an attachment, by convention or by path.
pub fn records_need_attachments(records: &[Value]) -> bool {
  records.iter().any(|record| {
    ["category", "severity", "attachment"]
      .iter()
      .any(|field| record.get(field).is_some_and(|value| !value.is_null()))
  })
}
