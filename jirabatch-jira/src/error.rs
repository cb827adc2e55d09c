//! Errors returned by the Jira client.

use jirabatch_core::tracker::RemoteError;
use thiserror::Error;

/// Result alias used by every endpoint.
pub type Result<T> = std::result::Result<T, JiraError>;

#[derive(Debug, Error)]
pub enum JiraError {
  #[error("Authentication failed. Please check your Jira credentials.")]
  Unauthorized { status: u16 },

  #[error("Issue {0} not found")]
  IssueNotFound(String),

  #[error("Invalid transition. The transition may not be available for the current status.")]
  InvalidTransition,

  #[error("No transition to '{target}' is available for {issue} (available: {available})")]
  UnknownTransition {
    issue: String,
    target: String,
    available: String,
  },

  #[error("No story points field found on this Jira instance")]
  StoryPointsFieldMissing,

  #[error("Jira rejected the request: HTTP {status} - {message}")]
  Rejected { status: u16, message: String },

  #[error("Unexpected error: HTTP {status} - {body}")]
  Unexpected { status: u16, body: String },

  #[error("{context}: {source}")]
  Transport {
    context: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("Failed to read {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

impl JiraError {
  /// HTTP status carried by the error, when a response was received.
  pub const fn status(&self) -> Option<u16> {
    match self {
      Self::Unauthorized { status } | Self::Rejected { status, .. } | Self::Unexpected { status, .. } => Some(*status),
      Self::IssueNotFound(_) => Some(404),
      Self::InvalidTransition => Some(400),
      Self::UnknownTransition { .. } | Self::StoryPointsFieldMissing | Self::Transport { .. } | Self::Io { .. } => {
        None
      }
    }
  }

  pub(crate) fn transport(context: impl Into<String>, source: reqwest::Error) -> Self {
    Self::Transport {
      context: context.into(),
      source,
    }
  }
}

impl From<JiraError> for RemoteError {
  fn from(err: JiraError) -> Self {
    Self::new(err.status(), err.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_remote_error_keeps_status() {
    let remote: RemoteError = JiraError::IssueNotFound("CPG-1".to_string()).into();
    assert_eq!(remote.status, Some(404));
    assert_eq!(remote.message, "Issue CPG-1 not found");

    let remote: RemoteError = JiraError::StoryPointsFieldMissing.into();
    assert_eq!(remote.status, None);
  }

  #[test]
  fn test_rejected_message() {
    let err = JiraError::Rejected {
      status: 400,
      message: "summary: Field 'summary' is required".to_string(),
    };
    assert_eq!(
      err.to_string(),
      "Jira rejected the request: HTTP 400 - summary: Field 'summary' is required"
    );
  }
}
