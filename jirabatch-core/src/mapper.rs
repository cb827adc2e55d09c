//! # Payload Mapping
//!
//! Translates validated records into the ordered list of remote mutations
//! they imply. Order matters: a transition lands before a comment so the
//! comment can talk about the new state, and the attachment goes last.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::attachment::{AttachmentRef, AttachmentResolver};
use crate::error::BatchError;
use crate::record::{CreateRecord, OperationRecord, UpdateRecord};

/// Fields for a new issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDraft {
  pub project_key: String,
  pub summary: String,
  pub description: Option<String>,
  /// Issue type name (`Story`, `Feature`, ...) or a numeric type id.
  pub issue_type: String,
  /// Parent epic key.
  pub parent: Option<String>,
  pub labels: BTreeSet<String>,
}

/// One atomic remote mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedOperation {
  CreateIssue(IssueDraft),
  TransitionStatus { issue: String, target: String },
  AddComment { issue: String, body: String },
  AssignToSelf { issue: String },
  SetLabels { issue: String, labels: BTreeSet<String> },
  SetPoints { issue: String, points: u64 },
  AttachFile { issue: String, attachment: AttachmentRef },
}

impl MappedOperation {
  /// Short operation name used in reports and logs.
  pub const fn name(&self) -> &'static str {
    match self {
      Self::CreateIssue(_) => "CreateIssue",
      Self::TransitionStatus { .. } => "TransitionStatus",
      Self::AddComment { .. } => "AddComment",
      Self::AssignToSelf { .. } => "AssignToSelf",
      Self::SetLabels { .. } => "SetLabels",
      Self::SetPoints { .. } => "SetPoints",
      Self::AttachFile { .. } => "AttachFile",
    }
  }
}

impl fmt::Display for MappedOperation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::CreateIssue(draft) => {
        write!(f, "create {} in {} \"{}\"", draft.issue_type, draft.project_key, draft.summary)?;
        if let Some(parent) = &draft.parent {
          write!(f, " under {parent}")?;
        }
        Ok(())
      }
      Self::TransitionStatus { issue, target } => write!(f, "transition {issue} to '{target}'"),
      Self::AddComment { issue, .. } => write!(f, "comment on {issue}"),
      Self::AssignToSelf { issue } => write!(f, "assign {issue} to self"),
      Self::SetLabels { issue, labels } => {
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        write!(f, "label {issue} with {}", labels.join(", "))
      }
      Self::SetPoints { issue, points } => write!(f, "set story points of {issue} to {points}"),
      Self::AttachFile { issue, attachment } => write!(f, "attach {} to {issue}", attachment.file_name()),
    }
  }
}

/// Settings that influence mapping but do not come from the records.
#[derive(Debug, Clone, Default)]
pub struct MapperOptions {
  /// Project for new issues; inferred from the epic key when unset.
  pub project: Option<String>,
  /// Insert an assignment to the authenticated user into update records.
  pub assign_self: bool,
}

/// Maps validated records to operations.
pub struct PayloadMapper<'a> {
  options: MapperOptions,
  resolver: Option<&'a dyn AttachmentResolver>,
}

impl<'a> PayloadMapper<'a> {
  pub fn new(options: MapperOptions, resolver: Option<&'a dyn AttachmentResolver>) -> Self {
    Self { options, resolver }
  }

  pub const fn options(&self) -> &MapperOptions {
    &self.options
  }

  /// Produce the ordered operations for a record.
  ///
  /// Create records always yield exactly one `CreateIssue`. Transition names
  /// are passed through unchanged; an unknown name fails remotely.
  pub fn map(&self, record: &OperationRecord) -> Result<Vec<MappedOperation>, BatchError> {
    let operations = match record {
      OperationRecord::Create(create) => vec![MappedOperation::CreateIssue(self.draft(create)?)],
      OperationRecord::Update(update) => self.update_operations(update)?,
    };

    debug!(
      "Mapped {} to {} operation(s)",
      record.identifying_key(),
      operations.len()
    );
    Ok(operations)
  }

  fn draft(&self, create: &CreateRecord) -> Result<IssueDraft, BatchError> {
    let project_key = self.project_for(create)?;

    Ok(IssueDraft {
      project_key,
      summary: create.summary.clone(),
      description: create.description.clone(),
      issue_type: create.issue_type.clone(),
      parent: create.epic.clone(),
      labels: create.changes.labels.clone().unwrap_or_default(),
    })
  }

  fn project_for(&self, create: &CreateRecord) -> Result<String, BatchError> {
    match (&self.options.project, &create.epic) {
      (Some(project), Some(epic)) => {
        if epic.starts_with(&format!("{project}-")) {
          Ok(project.clone())
        } else {
          Err(BatchError::mapping(format!(
            "epic {epic} does not belong to project {project}"
          )))
        }
      }
      (Some(project), None) => Ok(project.clone()),
      (None, Some(epic)) => infer_project_from_epic(epic).ok_or_else(|| {
        BatchError::mapping(format!("cannot infer a project key from epic '{epic}'"))
      }),
      (None, None) => Err(BatchError::mapping(
        "no project configured and no epic to infer it from",
      )),
    }
  }

  fn update_operations(&self, update: &UpdateRecord) -> Result<Vec<MappedOperation>, BatchError> {
    let issue = &update.issue;
    let changes = &update.changes;
    let mut operations = Vec::new();

    if let Some(target) = &changes.status {
      operations.push(MappedOperation::TransitionStatus {
        issue: issue.clone(),
        target: target.clone(),
      });
    }

    if let Some(body) = &changes.comment {
      operations.push(MappedOperation::AddComment {
        issue: issue.clone(),
        body: body.clone(),
      });
    }

    if self.options.assign_self {
      operations.push(MappedOperation::AssignToSelf { issue: issue.clone() });
    }

    if let Some(labels) = changes.labels.as_ref().filter(|labels| !labels.is_empty()) {
      operations.push(MappedOperation::SetLabels {
        issue: issue.clone(),
        labels: labels.clone(),
      });
    }

    if let Some(points) = changes.points {
      operations.push(MappedOperation::SetPoints {
        issue: issue.clone(),
        points,
      });
    }

    if let Some(spec) = &changes.attachment {
      let resolver = self.resolver.ok_or_else(|| {
        BatchError::mapping("record requests an attachment but no certificate directory is configured")
      })?;
      operations.push(MappedOperation::AttachFile {
        issue: issue.clone(),
        attachment: resolver.resolve(spec)?,
      });
    }

    Ok(operations)
  }
}

/// Infer the project key from an epic key such as `CPG-7`.
pub fn infer_project_from_epic(epic: &str) -> Option<String> {
  let (project, number) = epic.split_once('-')?;
  if project.is_empty() || number.is_empty() {
    return None;
  }
  Some(project.to_string())
}
