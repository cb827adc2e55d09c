//! # Batch Execution
//!
//! Applies records strictly in input order. Failures are isolated per
//! record: a record stops dispatching at its first failed operation, and the
//! next record always runs.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::BatchError;
use crate::mapper::{MappedOperation, PayloadMapper};
use crate::record::{OperationRecord, raw_identifying_key, validate_record};
use crate::tracker::IssueTracker;

/// Terminal state of a record after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
  /// Every operation succeeded (or there was nothing to do).
  Succeeded,
  /// Some operations succeeded before the first failure.
  PartiallyFailed,
  /// Nothing was applied.
  Failed,
  /// The record failed validation and never reached mapping.
  Rejected,
}

impl RecordState {
  pub const fn label(self) -> &'static str {
    match self {
      Self::Succeeded => "Succeeded",
      Self::PartiallyFailed => "PartiallyFailed",
      Self::Failed => "Failed",
      Self::Rejected => "Rejected",
    }
  }
}

/// Outcome of one dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
  /// The remote call succeeded; `remote_id` holds e.g. a created issue key.
  Succeeded { remote_id: Option<String> },
  Failed(BatchError),
}

/// A dispatched operation paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
  pub operation: MappedOperation,
  pub outcome: OperationOutcome,
}

impl OperationResult {
  pub const fn is_success(&self) -> bool {
    matches!(self.outcome, OperationOutcome::Succeeded { .. })
  }
}

/// Everything the executor learned about one input record.
#[derive(Debug, Clone)]
pub struct RecordOutcome {
  /// Zero-based position in the input array.
  pub index: usize,
  /// `issue` or `summary` of the record, or `record #N`.
  pub key: String,
  /// The validated record, absent when validation failed.
  pub record: Option<OperationRecord>,
  pub state: RecordState,
  /// Results of the operations that were dispatched, in order.
  pub results: Vec<OperationResult>,
  /// Operations that were mapped but never dispatched because an earlier one
  /// failed. A resume can start from here.
  pub skipped: Vec<MappedOperation>,
  /// The first error the record hit.
  pub error: Option<BatchError>,
}

impl RecordOutcome {
  fn rejected(index: usize, key: String, error: BatchError) -> Self {
    Self {
      index,
      key,
      record: None,
      state: RecordState::Rejected,
      results: Vec::new(),
      skipped: Vec::new(),
      error: Some(error),
    }
  }

  /// Key of the issue created by this record, if any.
  pub fn created_issue(&self) -> Option<&str> {
    self.results.iter().find_map(|result| match (&result.operation, &result.outcome) {
      (MappedOperation::CreateIssue(_), OperationOutcome::Succeeded { remote_id }) => remote_id.as_deref(),
      _ => None,
    })
  }
}

/// A record's mapping computed without touching the network.
#[derive(Debug, Clone)]
pub struct PlannedRecord {
  pub index: usize,
  pub key: String,
  pub plan: Result<Vec<MappedOperation>, BatchError>,
}

/// Validate and map every record without dispatching anything.
pub fn plan_records(mapper: &PayloadMapper<'_>, records: &[Value]) -> Vec<PlannedRecord> {
  records
    .iter()
    .enumerate()
    .map(|(index, value)| {
      let (key, plan) = match validate_record(value) {
        Ok(record) => (record.identifying_key().to_string(), mapper.map(&record)),
        Err(e) => (raw_identifying_key(value, index), Err(e)),
      };
      PlannedRecord { index, key, plan }
    })
    .collect()
}

/// Runs a batch against an [`IssueTracker`].
pub struct BatchExecutor<'a, T: IssueTracker> {
  tracker: &'a mut T,
  mapper: &'a PayloadMapper<'a>,
}

impl<'a, T: IssueTracker> BatchExecutor<'a, T> {
  pub fn new(tracker: &'a mut T, mapper: &'a PayloadMapper<'a>) -> Self {
    Self { tracker, mapper }
  }

  /// Execute every record in input order and return one outcome per record.
  pub async fn run(&mut self, records: &[Value]) -> Vec<RecordOutcome> {
    let mut outcomes = Vec::with_capacity(records.len());

    for (index, value) in records.iter().enumerate() {
      let outcome = self.run_record(index, value).await;
      info!("{} -> {}", outcome.key, outcome.state.label());
      outcomes.push(outcome);
    }

    outcomes
  }

  async fn run_record(&mut self, index: usize, value: &Value) -> RecordOutcome {
    let record = match validate_record(value) {
      Ok(record) => record,
      Err(e) => {
        let key = raw_identifying_key(value, index);
        warn!("Skipping {key}: {e}");
        return RecordOutcome::rejected(index, key, e);
      }
    };

    let key = record.identifying_key().to_string();
    info!("Processing {key}");

    let operations = match self.mapper.map(&record) {
      Ok(operations) => operations,
      Err(e) => {
        warn!("Cannot apply {key}: {e}");
        return RecordOutcome {
          index,
          key,
          record: Some(record),
          state: RecordState::Failed,
          results: Vec::new(),
          skipped: Vec::new(),
          error: Some(e),
        };
      }
    };

    let mut results = Vec::with_capacity(operations.len());
    let mut remaining = operations.into_iter();
    let mut error = None;

    for operation in remaining.by_ref() {
      debug!("Dispatching {operation}");
      match self.dispatch(&operation).await {
        Ok(remote_id) => results.push(OperationResult {
          operation,
          outcome: OperationOutcome::Succeeded { remote_id },
        }),
        Err(e) => {
          warn!("{operation} failed: {e}");
          error = Some(e.clone());
          results.push(OperationResult {
            operation,
            outcome: OperationOutcome::Failed(e),
          });
          break;
        }
      }
    }

    let skipped: Vec<MappedOperation> = remaining.collect();
    let succeeded = results.iter().filter(|result| result.is_success()).count();
    let state = match (&error, succeeded) {
      (None, _) => RecordState::Succeeded,
      (Some(_), 0) => RecordState::Failed,
      (Some(_), _) => RecordState::PartiallyFailed,
    };

    RecordOutcome {
      index,
      key,
      record: Some(record),
      state,
      results,
      skipped,
      error,
    }
  }

  async fn dispatch(&mut self, operation: &MappedOperation) -> Result<Option<String>, BatchError> {
    match operation {
      MappedOperation::CreateIssue(draft) => {
        let key = self.tracker.create_issue(draft).await?;
        info!("Created {key} ({})", draft.summary);
        Ok(Some(key))
      }
      MappedOperation::TransitionStatus { issue, target } => {
        self.tracker.transition_issue(issue, target).await?;
        Ok(None)
      }
      MappedOperation::AddComment { issue, body } => {
        self.tracker.add_comment(issue, body).await?;
        Ok(None)
      }
      MappedOperation::AssignToSelf { issue } => {
        self.tracker.assign_to_self(issue).await?;
        Ok(None)
      }
      MappedOperation::SetLabels { issue, labels } => {
        self.tracker.set_labels(issue, labels).await?;
        Ok(None)
      }
      MappedOperation::SetPoints { issue, points } => {
        self.tracker.set_story_points(issue, *points).await?;
        Ok(None)
      }
      MappedOperation::AttachFile { issue, attachment } => {
        self.tracker.upload_attachment(issue, &attachment.path).await?;
        Ok(Some(attachment.file_name()))
      }
    }
  }
}
