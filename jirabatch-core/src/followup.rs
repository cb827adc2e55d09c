//! # Follow-up Update Files
//!
//! After issues are created, the fields that only apply to existing issues
//! (status, comment, points, attachments) are written out as update records
//! that can be fed straight back into `apply`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::executor::RecordOutcome;
use crate::record::{AttachmentSpec, OperationRecord};

/// Status used for follow-up records when neither the record nor the
/// configuration names one.
pub const DEFAULT_FOLLOWUP_STATUS: &str = "To Do";

/// One generated update record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowupEntry {
  pub issue: String,
  pub status: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
  pub labels: Vec<String>,
  pub points: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub severity: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub attachment: Option<String>,
}

/// Build follow-up entries for every issue created in a run.
pub fn build_followups(outcomes: &[RecordOutcome], default_status: &str) -> Vec<FollowupEntry> {
  outcomes
    .iter()
    .filter_map(|outcome| {
      let issue = outcome.created_issue()?;
      let Some(OperationRecord::Create(create)) = &outcome.record else {
        return None;
      };
      let changes = &create.changes;

      let comment = changes
        .comment
        .clone()
        .or_else(|| create.rtm.as_ref().map(|rtm| format!("RTM {rtm} certificate created.")));

      let (category, severity, attachment) = match &changes.attachment {
        Some(AttachmentSpec::Convention { category, severity }) => {
          (Some(category.clone()), Some(severity.clone()), None)
        }
        Some(AttachmentSpec::Path(path)) => (None, None, Some(path.display().to_string())),
        None => (None, None, None),
      };

      Some(FollowupEntry {
        issue: issue.to_string(),
        status: changes.status.clone().unwrap_or_else(|| default_status.to_string()),
        comment,
        labels: changes.labels.iter().flatten().cloned().collect(),
        points: changes.points.unwrap_or(0),
        category,
        severity,
        attachment,
      })
    })
    .collect()
}

/// Fields of a create record that only reach Jira through the follow-up
/// file. Empty for update records.
pub fn followup_only_fields(record: &OperationRecord) -> Vec<&'static str> {
  let OperationRecord::Create(create) = record else {
    return Vec::new();
  };
  let changes = &create.changes;

  let mut fields = Vec::new();
  if changes.status.is_some() {
    fields.push("status");
  }
  if changes.comment.is_some() {
    fields.push("comment");
  }
  if changes.points.is_some() {
    fields.push("points");
  }
  match &changes.attachment {
    Some(AttachmentSpec::Convention { .. }) => fields.push("category/severity"),
    Some(AttachmentSpec::Path(_)) => fields.push("attachment"),
    None => {}
  }
  fields
}

/// `records.json` becomes `records_update.json` in the same directory.
pub fn default_followup_path(input: &Path) -> PathBuf {
  let stem = input
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_else(|| "records".to_string());
  input.with_file_name(format!("{stem}_update.json"))
}

/// Write follow-up entries as pretty-printed JSON.
pub fn write_followups(path: &Path, entries: &[FollowupEntry]) -> Result<()> {
  let content = serde_json::to_string_pretty(entries).context("Failed to serialize follow-up records")?;
  fs::write(path, content).with_context(|| format!("Failed to write follow-up records to {}", path.display()))?;
  Ok(())
}
