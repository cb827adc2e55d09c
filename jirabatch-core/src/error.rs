//! # Batch Errors
//!
//! The per-record error taxonomy. Every variant is caught at the record
//! boundary inside the executor and turned into outcome data; none of them
//! abort a run.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failure raised while validating, mapping or dispatching one record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
  /// The record is malformed; it never reaches the network.
  #[error("invalid field '{field}': {reason}")]
  Validation { field: String, reason: String },

  /// The record is well-formed but describes an unsupported combination.
  #[error("{0}")]
  Mapping(String),

  /// No attachment file exists for the requested category/severity pair.
  #[error("no attachment named {candidates} in {}", dir.display())]
  AttachmentNotFound { candidates: String, dir: PathBuf },

  /// The remote collaborator rejected the call or could not be reached.
  #[error("{}", format_remote(*status, message))]
  Remote { status: Option<u16>, message: String },
}

fn format_remote(status: Option<u16>, message: &str) -> String {
  match status {
    Some(code) => format!("HTTP {code}: {message}"),
    None => message.to_string(),
  }
}

impl BatchError {
  pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::Validation {
      field: field.into(),
      reason: reason.into(),
    }
  }

  pub fn mapping(message: impl Into<String>) -> Self {
    Self::Mapping(message.into())
  }

  pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
    Self::Remote {
      status,
      message: message.into(),
    }
  }

  /// The coarse kind of this error, used by the reporter.
  pub const fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation { .. } => ErrorKind::Validation,
      Self::Mapping(_) => ErrorKind::Mapping,
      Self::AttachmentNotFound { .. } => ErrorKind::AttachmentNotFound,
      Self::Remote { .. } => ErrorKind::Remote,
    }
  }
}

/// Error kinds surfaced in summaries and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  Validation,
  Mapping,
  AttachmentNotFound,
  Remote,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Self::Validation => "ValidationError",
      Self::Mapping => "MappingError",
      Self::AttachmentNotFound => "AttachmentNotFoundError",
      Self::Remote => "RemoteError",
    };
    f.write_str(label)
  }
}
