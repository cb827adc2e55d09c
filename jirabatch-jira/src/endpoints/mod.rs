//! # Jira API Endpoints
//!
//! Endpoint implementations grouped by REST resource. Every call goes through
//! `/rest/api/3` with Basic authentication.

pub mod attachments;
pub mod comments;
pub mod fields;
pub mod issues;
pub mod myself;
pub mod transitions;

#[cfg(test)]
pub(crate) mod test_support {
  use crate::client::{JiraClient, create_jira_client};

  pub(crate) fn client_for(base_url: &str) -> JiraClient {
    create_jira_client(base_url, "test_user", "test_token")
  }
}
