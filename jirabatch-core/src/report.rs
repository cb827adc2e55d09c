//! # Outcome Reporting
//!
//! Pure aggregation of record outcomes into a run summary.

use serde::Serialize;

use crate::error::ErrorKind;
use crate::executor::{RecordOutcome, RecordState};

/// One record that did not fully succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureLine {
  /// One-based record position, as a human would count it.
  pub record: usize,
  pub key: String,
  pub state: RecordState,
  pub kind: Option<ErrorKind>,
  pub reason: String,
  /// Operations that succeeded before the failure.
  pub applied: Vec<String>,
  /// Operations never dispatched.
  pub skipped: Vec<String>,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
  pub total: usize,
  pub succeeded: usize,
  pub partially_failed: usize,
  pub failed: usize,
  pub rejected: usize,
  /// Issue keys created during the run.
  pub created: Vec<String>,
  pub failures: Vec<FailureLine>,
}

impl BatchSummary {
  pub fn from_outcomes(outcomes: &[RecordOutcome]) -> Self {
    let mut summary = Self {
      total: outcomes.len(),
      ..Self::default()
    };

    for outcome in outcomes {
      match outcome.state {
        RecordState::Succeeded => summary.succeeded += 1,
        RecordState::PartiallyFailed => summary.partially_failed += 1,
        RecordState::Failed => summary.failed += 1,
        RecordState::Rejected => summary.rejected += 1,
      }

      if let Some(key) = outcome.created_issue() {
        summary.created.push(key.to_string());
      }

      if outcome.state != RecordState::Succeeded {
        summary.failures.push(FailureLine {
          record: outcome.index + 1,
          key: outcome.key.clone(),
          state: outcome.state,
          kind: outcome.error.as_ref().map(|e| e.kind()),
          reason: outcome
            .error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown failure".to_string()),
          applied: outcome
            .results
            .iter()
            .filter(|result| result.is_success())
            .map(|result| result.operation.name().to_string())
            .collect(),
          skipped: outcome.skipped.iter().map(|op| op.name().to_string()).collect(),
        });
      }
    }

    summary
  }

  /// True when every record reached `Succeeded`.
  pub const fn all_succeeded(&self) -> bool {
    self.succeeded == self.total
  }

  /// Number of records that failed validation.
  pub fn validation_failures(&self) -> usize {
    self
      .failures
      .iter()
      .filter(|line| line.kind == Some(ErrorKind::Validation))
      .count()
  }
}
