//! Helpers for reading credentials stored in `.netrc` files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::creds::Credentials;

/// Returns the path to the `.netrc` file for the provided home directory.
///
/// ```
/// use std::path::Path;
/// use jirabatch_core::creds::netrc::get_netrc_path;
///
/// let path = get_netrc_path(Path::new("/home/user"));
/// assert_eq!(path, Path::new("/home/user/.netrc"));
/// ```
pub fn get_netrc_path(home: &Path) -> PathBuf {
  home.join(".netrc")
}

/// Parses a `.netrc` file and returns credentials for the requested machine.
///
/// Tokens may be spread across lines in any layout. An entry only counts once
/// both `login` and `password` are present; otherwise `Ok(None)` is returned.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn parse_netrc_file(path: &Path, target_machine: &str) -> Result<Option<Credentials>> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  Ok(parse_netrc(&content, target_machine))
}

/// Look up `target_machine` in `.netrc` content.
pub fn parse_netrc(content: &str, target_machine: &str) -> Option<Credentials> {
  let mut tokens = content
    .lines()
    .map(|line| line.split('#').next().unwrap_or(""))
    .flat_map(str::split_whitespace);

  let mut in_target = false;
  let mut username = None;
  let mut password = None;

  while let Some(token) = tokens.next() {
    match token {
      "machine" | "default" => {
        if in_target {
          break;
        }
        in_target = token == "machine" && tokens.next() == Some(target_machine);
      }
      "login" if in_target => username = tokens.next().map(str::to_string),
      "password" if in_target => password = tokens.next().map(str::to_string),
      _ => {}
    }
  }

  match (username, password) {
    (Some(username), Some(password)) => Some(Credentials { username, password }),
    _ => None,
  }
}

/// Normalizes a Jira host URL by removing protocol prefixes and trailing
/// slashes, leaving the form used as a `.netrc` machine name.
pub fn normalize_host(raw_host: &str) -> String {
  raw_host
    .trim()
    .trim_start_matches("https://")
    .trim_start_matches("http://")
    .trim_end_matches('/')
    .to_string()
}
