//! URL helpers for the Jira host setting.
//!
//! Hosts may be configured with or without a scheme; everything is normalized
//! to a base URL the HTTP client can join REST paths onto.

use anyhow::Result;
use url::{Position, Url};

use crate::consts::ENV_JIRA_HOST;

/// Get the $JIRA_HOST environment variable value with proper URL scheme.
///
/// If the host doesn't include a scheme (http:// or https://), assumes https://.
/// Returns an error if the environment variable is not set.
pub fn resolve_jira_base_url() -> Result<String> {
  match std::env::var(ENV_JIRA_HOST) {
    Ok(host) => ensure_url_scheme(&host),
    Err(_) => Err(anyhow::anyhow!(
      "Jira host environment variable '{ENV_JIRA_HOST}' not set"
    )),
  }
}

/// Resolve the Jira base URL from an explicit setting, falling back to
/// `$JIRA_HOST`.
pub fn resolve_jira_base_url_from(configured: Option<&str>) -> Result<String> {
  match configured.map(str::trim).filter(|host| !host.is_empty()) {
    Some(host) => ensure_url_scheme(host),
    None => resolve_jira_base_url().map_err(|_| {
      anyhow::anyhow!("No Jira host configured. Set [jira] host in config.toml or the '{ENV_JIRA_HOST}' environment variable")
    }),
  }
}

/// Normalize a URL by removing trailing slashes from the path when it's just
/// "/".
fn normalize_url(url: &Url) -> String {
  let mut result = String::new();
  result.push_str(&url[..Position::BeforePath]);

  let path = url.path();
  if path != "/" {
    result.push_str(path);
  }

  if let Some(query) = url.query() {
    result.push('?');
    result.push_str(query);
  }

  if let Some(fragment) = url.fragment() {
    result.push('#');
    result.push_str(fragment);
  }

  result
}

/// Parse a URL by prefixing it with https:// scheme.
fn parse_with_https_prefix(input: &str) -> Result<Url> {
  let mut candidate = input;

  if let Some(colon_index) = input.find(':') {
    let potential_scheme = &input[..colon_index];
    if ["http", "https"]
      .iter()
      .any(|scheme| potential_scheme.eq_ignore_ascii_case(scheme))
    {
      let remainder = input[colon_index + 1..].trim_start_matches('/');
      if !remainder.is_empty() {
        candidate = remainder;
      }
    }
  }

  let with_scheme = format!("https://{candidate}");
  Url::parse(&with_scheme).map_err(|_| anyhow::anyhow!("Failed to parse URL: '{input}'. Ensure it has a valid scheme."))
}

/// Ensure a URL has a proper scheme (http:// or https://).
///
/// If the input doesn't include a scheme, assumes https://. Also handles
/// malformed schemes like "http:/example.com" (missing slash).
pub fn ensure_url_scheme(input: &str) -> Result<String> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Err(anyhow::anyhow!("Host cannot be empty"));
  }

  let lowered = trimmed.to_ascii_lowercase();
  if lowered.starts_with("http:") && !lowered.starts_with("http://") {
    let remainder = trimmed.split_once(':').map(|(_, rest)| rest).unwrap_or("");
    return parse_with_https_prefix(remainder.trim_start_matches('/')).map(|url| normalize_url(&url));
  }

  if lowered.starts_with("https:") && !lowered.starts_with("https://") {
    let remainder = trimmed.split_once(':').map(|(_, rest)| rest).unwrap_or("");
    return parse_with_https_prefix(remainder.trim_start_matches('/')).map(|url| normalize_url(&url));
  }

  let url = if let Ok(url) = Url::parse(trimmed) {
    if url.scheme().len() > 1 && url.host().is_some() {
      url
    } else {
      parse_with_https_prefix(trimmed)?
    }
  } else {
    parse_with_https_prefix(trimmed)?
  };

  Ok(normalize_url(&url))
}
