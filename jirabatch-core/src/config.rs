//! # Configuration Management
//!
//! Handles the jirabatch configuration file and directory layout. Settings
//! are layered: command-line flags, then environment variables, then
//! `config.toml`, then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::attachment::DEFAULT_EXTENSIONS;
use crate::consts::{ENV_CERT_DIR, ENV_JIRA_HOST, ENV_PROJECT};
use crate::followup::DEFAULT_FOLLOWUP_STATUS;

/// Represents the configuration directories for jirabatch
#[derive(Debug, Clone)]
pub struct ConfigDirs {
  pub config_dir: PathBuf,
}

impl ConfigDirs {
  /// Create a new ConfigDirs instance
  pub fn new() -> Result<Self> {
    let proj_dirs = ProjectDirs::from("", "", "jirabatch").context("Failed to determine project directories")?;

    Ok(Self {
      config_dir: proj_dirs.config_dir().to_path_buf(),
    })
  }

  /// Get the config directory
  pub fn config_dir(&self) -> &PathBuf {
    &self.config_dir
  }

  /// Get the path to the configuration file
  pub fn config_path(&self) -> PathBuf {
    self.config_dir.join("config.toml")
  }

  /// Load the configuration file or return defaults when it does not exist
  pub fn load_config(&self) -> Result<BatchConfig> {
    BatchConfig::load(&self.config_path())
  }

  /// Write a default configuration file unless one already exists.
  ///
  /// Returns `true` when a new file was written.
  pub fn init(&self) -> Result<bool> {
    fs::create_dir_all(&self.config_dir).context("Failed to create config directory")?;

    let config_path = self.config_path();
    if config_path.exists() {
      return Ok(false);
    }

    BatchConfig::default().save(&config_path)?;
    Ok(true)
  }
}

/// Get the configuration directories
pub fn get_config_dirs() -> Result<ConfigDirs> {
  ConfigDirs::new()
}

/// Jira connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraSection {
  /// Jira Cloud base URL, e.g. `https://company.atlassian.net`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub host: Option<String>,
  /// Project key for new issues; inferred from epics when unset.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub project: Option<String>,
  /// Custom field id holding story points; discovered when unset.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub story_points_field: Option<String>,
}

/// Attachment lookup settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentSection {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cert_dir: Option<PathBuf>,
  /// Extensions tried in order for `{category}_{severity}.{ext}`.
  pub extensions: Vec<String>,
}

impl Default for AttachmentSection {
  fn default() -> Self {
    Self {
      cert_dir: None,
      extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
    }
  }
}

/// Batch behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplySection {
  /// Assign every updated issue to the authenticated user.
  pub assign_self: bool,
  /// Write `<input>_update.json` after creating issues.
  pub write_followup: bool,
  /// Status for follow-up records that do not name one.
  pub followup_status: String,
}

impl Default for ApplySection {
  fn default() -> Self {
    Self {
      assign_self: false,
      write_followup: true,
      followup_status: DEFAULT_FOLLOWUP_STATUS.to_string(),
    }
  }
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
  pub jira: JiraSection,
  pub attachments: AttachmentSection,
  pub apply: ApplySection,
}

impl BatchConfig {
  /// Load configuration from `path`, or defaults when the file is missing.
  pub fn load(path: &Path) -> Result<Self> {
    if !path.exists() {
      return Ok(Self::default());
    }

    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read config from {}", path.display()))?;

    toml::from_str(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
  }

  /// Save configuration to `path`, creating parent directories.
  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(path, content).with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
  }

  /// Overlay values from the environment onto the file values.
  pub fn apply_env(&mut self) {
    if let Some(host) = non_empty_env(ENV_JIRA_HOST) {
      self.jira.host = Some(host);
    }
    if let Some(project) = non_empty_env(ENV_PROJECT) {
      self.jira.project = Some(project);
    }
    if let Some(dir) = non_empty_env(ENV_CERT_DIR) {
      self.attachments.cert_dir = Some(PathBuf::from(dir));
    }
  }
}

fn non_empty_env(name: &str) -> Option<String> {
  std::env::var(name)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}
