//! # Operation Records
//!
//! Decoding of the loosely typed JSON definition files into fully typed
//! operation records. Every known field goes through an explicit
//! absent/null/present step so that nothing is coerced silently.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::BatchError;

/// Field names understood by the validator.
const KNOWN_FIELDS: &[&str] = &[
  "attachment",
  "category",
  "comment",
  "description",
  "epic",
  "issue",
  "issuetype",
  "labels",
  "points",
  "rtm",
  "severity",
  "status",
  "summary",
];

/// Fields that only make sense on create records.
const CREATE_ONLY_FIELDS: &[&str] = &["summary", "description", "epic"];

/// A validated record, either creating a new issue or updating an existing
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRecord {
  Create(CreateRecord),
  Update(UpdateRecord),
}

/// A record that creates a new issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRecord {
  pub summary: String,
  pub issue_type: String,
  pub epic: Option<String>,
  pub description: Option<String>,
  pub rtm: Option<String>,
  pub changes: FieldChanges,
}

/// A record that mutates an existing issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecord {
  pub issue: String,
  pub rtm: Option<String>,
  pub changes: FieldChanges,
}

/// Mutable fields shared by both record kinds.
///
/// On update records these drive the mapped operations; on create records
/// they are carried into the follow-up update file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldChanges {
  pub status: Option<String>,
  pub comment: Option<String>,
  pub labels: Option<BTreeSet<String>>,
  pub points: Option<u64>,
  pub attachment: Option<AttachmentSpec>,
}

/// How a record asks for a file to be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSpec {
  /// Resolved through the `{category}_{severity}.{ext}` naming convention.
  Convention { category: String, severity: String },
  /// An explicit file path.
  Path(PathBuf),
}

impl OperationRecord {
  /// The key used to identify this record in reports.
  pub fn identifying_key(&self) -> &str {
    match self {
      Self::Create(create) => &create.summary,
      Self::Update(update) => &update.issue,
    }
  }

  pub const fn changes(&self) -> &FieldChanges {
    match self {
      Self::Create(create) => &create.changes,
      Self::Update(update) => &update.changes,
    }
  }
}

/// Best-effort identifying key for a raw record that may not validate.
pub fn raw_identifying_key(value: &Value, index: usize) -> String {
  let from_field = |name: &str| {
    value
      .get(name)
      .and_then(Value::as_str)
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_string)
  };

  from_field("issue")
    .or_else(|| from_field("summary"))
    .unwrap_or_else(|| format!("record #{}", index + 1))
}

/// Three-way view of a JSON object member.
enum Field<'a> {
  Absent,
  Null,
  Present(&'a Value),
}

fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Field<'a> {
  match obj.get(name) {
    None => Field::Absent,
    Some(Value::Null) => Field::Null,
    Some(value) => Field::Present(value),
  }
}

fn optional_string(obj: &Map<String, Value>, name: &str) -> Result<Option<String>, BatchError> {
  match field(obj, name) {
    Field::Absent => Ok(None),
    Field::Null => Err(BatchError::validation(name, "must not be null")),
    Field::Present(Value::String(s)) => {
      let trimmed = s.trim();
      if trimmed.is_empty() {
        Err(BatchError::validation(name, "must not be empty"))
      } else {
        Ok(Some(trimmed.to_string()))
      }
    }
    Field::Present(other) => Err(BatchError::validation(
      name,
      format!("expected a string, found {}", json_type_name(other)),
    )),
  }
}

fn optional_labels(obj: &Map<String, Value>) -> Result<Option<BTreeSet<String>>, BatchError> {
  let items = match field(obj, "labels") {
    Field::Absent => return Ok(None),
    Field::Null => return Err(BatchError::validation("labels", "must not be null")),
    Field::Present(Value::Array(items)) => items,
    Field::Present(other) => {
      return Err(BatchError::validation(
        "labels",
        format!("expected an array of strings, found {}", json_type_name(other)),
      ));
    }
  };

  let mut labels = BTreeSet::new();
  for (position, item) in items.iter().enumerate() {
    match item {
      Value::String(label) if !label.trim().is_empty() => {
        labels.insert(label.trim().to_string());
      }
      Value::String(_) => {
        return Err(BatchError::validation(
          "labels",
          format!("label at position {position} is empty"),
        ));
      }
      other => {
        return Err(BatchError::validation(
          "labels",
          format!("label at position {position} is {}, expected a string", json_type_name(other)),
        ));
      }
    }
  }

  Ok(Some(labels))
}

fn optional_points(obj: &Map<String, Value>) -> Result<Option<u64>, BatchError> {
  match field(obj, "points") {
    Field::Absent => Ok(None),
    Field::Null => Err(BatchError::validation("points", "must not be null")),
    Field::Present(Value::Number(n)) => {
      if let Some(points) = n.as_u64() {
        Ok(Some(points))
      } else if n.as_i64().is_some() {
        Err(BatchError::validation("points", format!("must not be negative, got {n}")))
      } else {
        Err(BatchError::validation("points", format!("must be a whole number, got {n}")))
      }
    }
    Field::Present(other) => Err(BatchError::validation(
      "points",
      format!("expected a non-negative integer, found {}", json_type_name(other)),
    )),
  }
}

fn attachment_spec(obj: &Map<String, Value>, key: &str) -> Result<Option<AttachmentSpec>, BatchError> {
  let explicit = optional_string(obj, "attachment")?;
  let category = optional_string(obj, "category")?;
  let severity = optional_string(obj, "severity")?;

  match (explicit, category, severity) {
    (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(BatchError::validation(
      "attachment",
      "cannot be combined with category/severity",
    )),
    (Some(path), None, None) => Ok(Some(AttachmentSpec::Path(PathBuf::from(path)))),
    (None, Some(category), Some(severity)) => Ok(Some(AttachmentSpec::Convention { category, severity })),
    (None, Some(_), None) | (None, None, Some(_)) => {
      warn!("{key}: category and severity must both be set to attach a file; skipping attachment");
      Ok(None)
    }
    (None, None, None) => Ok(None),
  }
}

const fn json_type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Validate a single decoded JSON value into an [`OperationRecord`].
///
/// This is a pure function of its input: the only side effect is a warning
/// for unknown or ignored fields.
pub fn validate_record(value: &Value) -> Result<OperationRecord, BatchError> {
  let Value::Object(obj) = value else {
    return Err(BatchError::validation(
      "record",
      format!("expected an object, found {}", json_type_name(value)),
    ));
  };

  let issue = optional_string(obj, "issue")?;
  let issue_type = optional_string(obj, "issuetype")?;
  let summary = optional_string(obj, "summary")?;
  let description = optional_string(obj, "description")?;
  let epic = optional_string(obj, "epic")?;
  let rtm = optional_string(obj, "rtm")?;

  let key = issue
    .as_deref()
    .or(summary.as_deref())
    .unwrap_or("record")
    .to_string();

  for name in obj.keys() {
    if !KNOWN_FIELDS.contains(&name.as_str()) {
      warn!("{key}: ignoring unknown field '{name}'");
    }
  }

  let changes = FieldChanges {
    status: optional_string(obj, "status")?,
    comment: optional_string(obj, "comment")?,
    labels: optional_labels(obj)?,
    points: optional_points(obj)?,
    attachment: attachment_spec(obj, &key)?,
  };

  match (issue, issue_type) {
    (Some(_), Some(_)) => Err(BatchError::validation(
      "issuetype",
      "a record cannot have both 'issue' and 'issuetype'",
    )),
    (None, None) => Err(BatchError::validation(
      "issue",
      "a record needs either 'issue' (update) or 'issuetype' (create)",
    )),
    (None, Some(issue_type)) => {
      let summary = summary.ok_or_else(|| BatchError::validation("summary", "create records require a summary"))?;
      debug!("Validated create record '{summary}' ({issue_type})");
      Ok(OperationRecord::Create(CreateRecord {
        summary,
        issue_type,
        epic,
        description,
        rtm,
        changes,
      }))
    }
    (Some(issue), None) => {
      for name in CREATE_ONLY_FIELDS {
        if obj.contains_key(*name) {
          warn!("{issue}: '{name}' is only used when creating issues; ignoring it");
        }
      }
      debug!("Validated update record for {issue}");
      Ok(OperationRecord::Update(UpdateRecord { issue, rtm, changes }))
    }
  }
}

/// Load a JSON definition file and return its raw records.
///
/// The file must contain a JSON array; individual elements are validated
/// later, one at a time, so that one bad record does not reject the file.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

  let value: Value =
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {} as JSON", path.display()))?;

  match value {
    Value::Array(items) => Ok(items),
    other => Err(anyhow::anyhow!(
      "{} must contain a JSON array of records, found {}",
      path.display(),
      json_type_name(&other)
    )),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use tempfile::TempDir;

  use super::*;

  fn expect_validation_field(value: Value, expected_field: &str) {
    match validate_record(&value) {
      Err(BatchError::Validation { field, .. }) => assert_eq!(field, expected_field),
      other => panic!("expected validation error on '{expected_field}', got {other:?}"),
    }
  }

  #[test]
  fn test_missing_issue_and_issuetype_is_rejected() {
    expect_validation_field(json!({}), "issue");
    expect_validation_field(json!({"summary": "Only a summary"}), "issue");
    expect_validation_field(json!({"status": "Done", "comment": "hello"}), "issue");
  }

  #[test]
  fn test_issue_and_issuetype_together_is_rejected() {
    expect_validation_field(
      json!({"issue": "CPG-1", "issuetype": "Story", "summary": "Mixed"}),
      "issuetype",
    );
  }

  #[test]
  fn test_create_record_requires_non_empty_summary() {
    expect_validation_field(json!({"issuetype": "Feature"}), "summary");
    expect_validation_field(json!({"issuetype": "Feature", "summary": "   "}), "summary");
  }

  #[test]
  fn test_valid_create_record() {
    let record = validate_record(&json!({
      "rtm": "RTM-12",
      "epic": "CPG-7",
      "summary": "Maneuver certificate",
      "description": "Certificate for maneuver checks",
      "issuetype": "Feature",
      "labels": ["certificate", "automation", "certificate"]
    }))
    .unwrap();

    let OperationRecord::Create(create) = record else {
      panic!("expected a create record");
    };
    assert_eq!(create.summary, "Maneuver certificate");
    assert_eq!(create.issue_type, "Feature");
    assert_eq!(create.epic.as_deref(), Some("CPG-7"));
    assert_eq!(create.rtm.as_deref(), Some("RTM-12"));
    let labels: Vec<_> = create.changes.labels.unwrap().into_iter().collect();
    assert_eq!(labels, vec!["automation", "certificate"]);
  }

  #[test]
  fn test_valid_update_record() {
    let record = validate_record(&json!({
      "issue": "CPG-21",
      "status": "To Do",
      "comment": "RTM 4 certificate created.",
      "labels": ["certificate"],
      "points": 0,
      "category": "maneuver",
      "severity": "LOW"
    }))
    .unwrap();

    assert_eq!(record.identifying_key(), "CPG-21");
    let changes = record.changes();
    assert_eq!(changes.status.as_deref(), Some("To Do"));
    assert_eq!(changes.points, Some(0));
    assert_eq!(
      changes.attachment,
      Some(AttachmentSpec::Convention {
        category: "maneuver".to_string(),
        severity: "LOW".to_string(),
      })
    );
  }

  #[test]
  fn test_labels_must_be_non_empty_strings() {
    expect_validation_field(json!({"issue": "CPG-1", "labels": ["ok", ""]}), "labels");
    expect_validation_field(json!({"issue": "CPG-1", "labels": ["ok", 3]}), "labels");
    expect_validation_field(json!({"issue": "CPG-1", "labels": "ok"}), "labels");
  }

  #[test]
  fn test_labels_are_deduplicated() {
    let record = validate_record(&json!({"issue": "CPG-1", "labels": ["a", "a", "b"]})).unwrap();
    let labels = record.changes().labels.clone().unwrap();
    assert_eq!(labels.len(), 2);
    assert!(labels.contains("a"));
    assert!(labels.contains("b"));
  }

  #[test]
  fn test_points_must_be_non_negative_integer() {
    expect_validation_field(json!({"issue": "CPG-1", "points": -1}), "points");
    expect_validation_field(json!({"issue": "CPG-1", "points": 1.5}), "points");
    expect_validation_field(json!({"issue": "CPG-1", "points": 2.0}), "points");
    expect_validation_field(json!({"issue": "CPG-1", "points": "3"}), "points");

    let record = validate_record(&json!({"issue": "CPG-1", "points": 5})).unwrap();
    assert_eq!(record.changes().points, Some(5));
  }

  #[test]
  fn test_null_is_not_treated_as_absent() {
    expect_validation_field(json!({"issue": "CPG-1", "comment": null}), "comment");
    expect_validation_field(json!({"issue": null, "issuetype": "Story", "summary": "x"}), "issue");
  }

  #[test]
  fn test_wrong_type_is_rejected() {
    expect_validation_field(json!({"issue": 42}), "issue");
    expect_validation_field(json!({"issue": "CPG-1", "status": ["Done"]}), "status");
  }

  #[test]
  fn test_non_object_record_is_rejected() {
    expect_validation_field(json!("CPG-1"), "record");
    expect_validation_field(json!([1, 2]), "record");
  }

  #[test]
  fn test_explicit_attachment_conflicts_with_convention() {
    expect_validation_field(
      json!({"issue": "CPG-1", "attachment": "a.pdf", "category": "maneuver", "severity": "LOW"}),
      "attachment",
    );

    let record = validate_record(&json!({"issue": "CPG-1", "attachment": "extra/a.pdf"})).unwrap();
    assert_eq!(
      record.changes().attachment,
      Some(AttachmentSpec::Path(PathBuf::from("extra/a.pdf")))
    );
  }

  #[test]
  fn test_half_attachment_pair_is_ignored() {
    let record = validate_record(&json!({"issue": "CPG-1", "category": "maneuver"})).unwrap();
    assert_eq!(record.changes().attachment, None);
  }

  #[test]
  fn test_unknown_fields_are_ignored() {
    let record = validate_record(&json!({"issue": "CPG-1", "owner": "someone"})).unwrap();
    assert_eq!(record.identifying_key(), "CPG-1");
  }

  #[test]
  fn test_raw_identifying_key() {
    assert_eq!(raw_identifying_key(&json!({"issue": "CPG-3"}), 0), "CPG-3");
    assert_eq!(raw_identifying_key(&json!({"summary": "New thing"}), 0), "New thing");
    assert_eq!(raw_identifying_key(&json!({"issue": 7}), 4), "record #5");
    assert_eq!(raw_identifying_key(&json!("junk"), 1), "record #2");
  }

  #[test]
  fn test_load_records_requires_array() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.json");

    fs::write(&path, r#"[{"issue": "CPG-1"}, {"issue": "CPG-2"}]"#).unwrap();
    assert_eq!(load_records(&path).unwrap().len(), 2);

    fs::write(&path, r#"{"issue": "CPG-1"}"#).unwrap();
    let error = load_records(&path).unwrap_err().to_string();
    assert!(error.contains("JSON array"));

    fs::write(&path, "not json").unwrap();
    assert!(load_records(&path).is_err());
  }
}
