//! Authentication helpers for the Jira client.
//!
//! Credentials come from `~/.netrc` (the Jira host first, then
//! `atlassian.net`) and fall back to `JIRA_EMAIL` plus `JIRA_API_TOKEN`.

use std::path::Path;

use anyhow::{Context, Result};
use jirabatch_core::consts::{DEFAULT_JIRA_MACHINE, ENV_JIRA_API_TOKEN, ENV_JIRA_EMAIL};
use jirabatch_core::creds::Credentials;
use jirabatch_core::creds::netrc::{get_netrc_path, normalize_host, parse_netrc_file};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::client::{JiraClient, create_jira_client};

/// Retrieve Jira credentials for `jira_host`.
pub fn get_jira_credentials(home: &Path, jira_host: &str) -> Result<Credentials> {
  let normalized_host = normalize_host(jira_host);
  let netrc_path = get_netrc_path(home);

  if netrc_path.exists() {
    for machine in [normalized_host.as_str(), DEFAULT_JIRA_MACHINE] {
      if let Some(creds) = parse_netrc_file(&netrc_path, machine)? {
        debug!("Using .netrc credentials for machine {}", machine);
        return Ok(creds);
      }
    }
  }

  if let Some(creds) = credentials_from_env() {
    debug!("Using Jira credentials from {} and {}", ENV_JIRA_EMAIL, ENV_JIRA_API_TOKEN);
    return Ok(creds);
  }

  Err(anyhow::anyhow!(
    "Jira credentials not found. Add credentials for machine '{normalized_host}' or '{DEFAULT_JIRA_MACHINE}' to .netrc, \
     or set {ENV_JIRA_EMAIL} and {ENV_JIRA_API_TOKEN}."
  ))
}

fn credentials_from_env() -> Option<Credentials> {
  let username = std::env::var(ENV_JIRA_EMAIL).ok().filter(|v| !v.trim().is_empty())?;
  let password = std::env::var(ENV_JIRA_API_TOKEN).ok().filter(|v| !v.trim().is_empty())?;
  Some(Credentials { username, password })
}

/// Creates an authenticated Jira client for `base_url`.
pub fn create_jira_client_from_credentials(home: &Path, base_url: &str) -> Result<JiraClient> {
  let credentials = get_jira_credentials(home, base_url).context("Failed to get credentials")?;

  Ok(create_jira_client(
    base_url,
    &credentials.username,
    &credentials.password,
  ))
}

/// Creates a tokio runtime and an authenticated Jira client.
pub fn create_jira_runtime_and_client(home: &Path, base_url: &str) -> Result<(Runtime, JiraClient)> {
  let rt = Runtime::new().context("Failed to create async runtime")?;
  let client = create_jira_client_from_credentials(home, base_url)?;
  Ok((rt, client))
}

#[cfg(test)]
mod tests {
  use jirabatch_test_utils::{EnvVarGuard, NetrcGuard};

  use super::*;

  const NETRC: &str = r#"machine custom-jira-host.com
  login custom@example.com
  password custom-token

machine atlassian.net
  login net@example.com
  password net-token
"#;

  fn clear_env() -> (EnvVarGuard, EnvVarGuard) {
    let email = EnvVarGuard::new(ENV_JIRA_EMAIL);
    let token = EnvVarGuard::new(ENV_JIRA_API_TOKEN);
    email.remove();
    token.remove();
    (email, token)
  }

  #[test]
  fn test_netrc_host_then_fallback_machine() {
    let guard = NetrcGuard::new(NETRC);
    let _env = clear_env();

    let creds = get_jira_credentials(guard.home_dir(), "https://custom-jira-host.com/").unwrap();
    assert_eq!(creds.username, "custom@example.com");
    assert_eq!(creds.password, "custom-token");

    let creds = get_jira_credentials(guard.home_dir(), "nonexistent-host.com").unwrap();
    assert_eq!(creds.username, "net@example.com");
  }

  #[test]
  fn test_env_fallback() {
    let guard = NetrcGuard::new("");
    let (email, token) = clear_env();
    email.set("env@example.com");
    token.set("env-token");

    let creds = get_jira_credentials(guard.home_dir(), "company.atlassian.net").unwrap();
    assert_eq!(creds.username, "env@example.com");
    assert_eq!(creds.password, "env-token");
  }

  #[test]
  fn test_netrc_wins_over_env() {
    let guard = NetrcGuard::new(NETRC);
    let (email, token) = clear_env();
    email.set("env@example.com");
    token.set("env-token");

    let creds = get_jira_credentials(guard.home_dir(), "custom-jira-host.com").unwrap();
    assert_eq!(creds.username, "custom@example.com");
  }

  #[test]
  fn test_missing_credentials_error_message() {
    let guard = NetrcGuard::new("");
    let (email, _token) = clear_env();
    email.set("only-email@example.com");

    let error = get_jira_credentials(guard.home_dir(), "custom-jira-host.com")
      .unwrap_err()
      .to_string();
    assert!(error.contains("custom-jira-host.com"));
    assert!(error.contains("atlassian.net"));
    assert!(error.contains(ENV_JIRA_API_TOKEN));
  }

  #[test]
  fn test_create_client_uses_base_url() {
    let guard = NetrcGuard::new(NETRC);
    let _env = clear_env();

    let client = create_jira_client_from_credentials(guard.home_dir(), "https://custom-jira-host.com").unwrap();
    assert_eq!(client.base_url(), "https://custom-jira-host.com");
  }
}
