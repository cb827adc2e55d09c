//! # Client Creation
//!
//! Builds the authenticated Jira tracker and the runtime that drives it.

use anyhow::{Context, Result};
use directories::BaseDirs;
use jirabatch_core::url::resolve_jira_base_url_from;
use jirabatch_jira::{JiraClient, JiraTracker, create_jira_runtime_and_client};
use tokio::runtime::Runtime;
use tracing::info;

use crate::settings::Settings;

/// Resolve the Jira base URL and credentials, then create a runtime and client.
pub fn create_runtime_and_client(settings: &Settings) -> Result<(Runtime, JiraClient)> {
  let base_url = resolve_jira_base_url_from(settings.host.as_deref())?;
  let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;

  info!("Using Jira at {}", base_url);
  create_jira_runtime_and_client(base_dirs.home_dir(), &base_url)
}

/// Creates a tokio runtime and a [`JiraTracker`] configured from `settings`.
pub fn create_runtime_and_tracker(settings: &Settings) -> Result<(Runtime, JiraTracker)> {
  let (rt, client) = create_runtime_and_client(settings)?;
  let tracker = JiraTracker::new(client).with_story_points_field(settings.story_points_field.clone());
  Ok((rt, tracker))
}
