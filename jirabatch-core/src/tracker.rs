//! # Issue Tracker Seam
//!
//! The remote collaborator the executor dispatches to. The Jira client crate
//! implements it; tests implement it with in-memory fakes.

use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;

use crate::error::BatchError;
use crate::mapper::IssueDraft;

/// Failure returned by the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
  /// HTTP status, absent when the request never got a response.
  pub status: Option<u16>,
  pub message: String,
}

impl RemoteError {
  pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
    Self {
      status,
      message: message.into(),
    }
  }
}

impl From<RemoteError> for BatchError {
  fn from(err: RemoteError) -> Self {
    Self::Remote {
      status: err.status,
      message: err.message,
    }
  }
}

/// Remote operations needed to apply a batch.
///
/// Each method performs exactly one remote mutation (plus whatever lookups it
/// needs to address it) and is awaited before the next one starts.
#[allow(async_fn_in_trait)]
pub trait IssueTracker {
  /// Create an issue and return its key.
  async fn create_issue(&mut self, draft: &IssueDraft) -> Result<String, RemoteError>;

  /// Move an issue to the workflow state named `target`.
  async fn transition_issue(&mut self, issue: &str, target: &str) -> Result<(), RemoteError>;

  async fn add_comment(&mut self, issue: &str, body: &str) -> Result<(), RemoteError>;

  async fn set_labels(&mut self, issue: &str, labels: &BTreeSet<String>) -> Result<(), RemoteError>;

  async fn set_story_points(&mut self, issue: &str, points: u64) -> Result<(), RemoteError>;

  /// Upload a file. Implementations must send the `X-Atlassian-Token:
  /// no-check` header required for attachment uploads.
  async fn upload_attachment(&mut self, issue: &str, path: &Path) -> Result<(), RemoteError>;

  /// Assign an issue to the authenticated user.
  async fn assign_to_self(&mut self, issue: &str) -> Result<(), RemoteError>;
}
