//! # Credential Management
//!
//! Jira Cloud authenticates batch clients with an account email and an API
//! token. Both live in `~/.netrc` or in environment variables.

pub mod netrc;

/// Username (account email) and secret (API token) for a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}
