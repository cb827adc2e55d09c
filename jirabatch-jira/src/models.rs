use std::collections::BTreeSet;

use jirabatch_core::mapper::IssueDraft;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Represents Jira authentication credentials
#[derive(Clone)]
pub struct JiraAuth {
  pub username: String,
  pub api_token: String,
}

/// The authenticated user, from `/myself`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
  pub account_id: String,
  #[serde(default)]
  pub display_name: Option<String>,
  #[serde(default)]
  pub email_address: Option<String>,
}

/// Represents a Jira issue status
#[derive(Debug, Clone, Deserialize)]
pub struct JiraStatus {
  pub name: String,
}

/// Represents a Jira transition
#[derive(Debug, Clone, Deserialize)]
pub struct JiraTransition {
  pub id: String,
  pub name: String,
  /// Status the transition leads to.
  #[serde(default)]
  pub to: Option<JiraStatus>,
}

impl JiraTransition {
  /// Matches the transition id, or case-insensitively its name or target
  /// status.
  pub fn matches(&self, target: &str) -> bool {
    self.id == target
      || self.name.eq_ignore_ascii_case(target)
      || self
        .to
        .as_ref()
        .is_some_and(|status| status.name.eq_ignore_ascii_case(target))
  }
}

/// Represents a list of Jira transitions
#[derive(Debug, Deserialize)]
pub struct JiraTransitions {
  pub transitions: Vec<JiraTransition>,
}

/// Represents a transition request payload
#[derive(Debug, Serialize)]
pub struct TransitionRequest {
  pub transition: TransitionId,
}

/// Represents a transition ID for the request
#[derive(Debug, Serialize)]
pub struct TransitionId {
  pub id: String,
}

/// A field definition from `/field`
#[derive(Debug, Clone, Deserialize)]
pub struct JiraField {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub custom: bool,
}

/// Response to a successful issue creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
  pub id: String,
  pub key: String,
}

/// One uploaded attachment
#[derive(Debug, Clone, Deserialize)]
pub struct JiraAttachment {
  pub id: String,
  pub filename: String,
}

/// Error body Jira returns on 4xx responses
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraErrorBody {
  #[serde(default)]
  pub error_messages: Vec<String>,
  #[serde(default)]
  pub errors: serde_json::Map<String, Value>,
}

impl JiraErrorBody {
  /// Flatten messages and per-field errors into one line.
  pub fn summary(&self) -> Option<String> {
    let mut parts: Vec<String> = self.error_messages.clone();
    parts.extend(self.errors.iter().map(|(field, message)| match message {
      Value::String(message) => format!("{field}: {message}"),
      other => format!("{field}: {other}"),
    }));

    if parts.is_empty() { None } else { Some(parts.join("; ")) }
  }
}

/// Atlassian Document Format wrapper for plain text.
///
/// Blank lines separate paragraphs; single newlines become hard breaks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdfDocument {
  #[serde(rename = "type")]
  kind: &'static str,
  version: u8,
  content: Vec<Value>,
}

impl AdfDocument {
  pub fn from_text(text: &str) -> Self {
    let content = text
      .split("\n\n")
      .map(str::trim)
      .filter(|paragraph| !paragraph.is_empty())
      .map(|paragraph| {
        let mut nodes = Vec::new();
        for (i, line) in paragraph.lines().enumerate() {
          if i > 0 {
            nodes.push(json!({"type": "hardBreak"}));
          }
          if !line.is_empty() {
            nodes.push(json!({"type": "text", "text": line}));
          }
        }
        json!({"type": "paragraph", "content": nodes})
      })
      .collect();

    Self {
      kind: "doc",
      version: 1,
      content,
    }
  }
}

/// `{"key": ...}` reference used for projects and parents
#[derive(Debug, Clone, Serialize)]
pub struct KeyRef {
  pub key: String,
}

/// Issue types may be given by numeric id or by name.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum IssueTypeRef {
  Id { id: String },
  Name { name: String },
}

impl IssueTypeRef {
  pub fn parse(value: &str) -> Self {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
      Self::Id { id: value.to_string() }
    } else {
      Self::Name {
        name: value.to_string(),
      }
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateIssueFields {
  pub project: KeyRef,
  pub summary: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<AdfDocument>,
  pub issuetype: IssueTypeRef,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parent: Option<KeyRef>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub labels: Vec<String>,
}

/// Payload for `POST /issue`
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssueRequest {
  pub fields: CreateIssueFields,
}

impl From<&IssueDraft> for CreateIssueRequest {
  fn from(draft: &IssueDraft) -> Self {
    Self {
      fields: CreateIssueFields {
        project: KeyRef {
          key: draft.project_key.clone(),
        },
        summary: draft.summary.clone(),
        description: draft.description.as_deref().map(AdfDocument::from_text),
        issuetype: IssueTypeRef::parse(&draft.issue_type),
        parent: draft.parent.clone().map(|key| KeyRef { key }),
        labels: draft.labels.iter().cloned().collect(),
      },
    }
  }
}

/// Payload for `POST /issue/{key}/comment`
#[derive(Debug, Clone, Serialize)]
pub struct CommentRequest {
  pub body: AdfDocument,
}

/// Additive label update: `{"update": {"labels": [{"add": ...}]}}`
pub fn labels_update(labels: &BTreeSet<String>) -> Value {
  let ops: Vec<Value> = labels.iter().map(|label| json!({"add": label})).collect();
  json!({"update": {"labels": ops}})
}

/// Payload for `PUT /issue/{key}/assignee`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeRequest {
  pub account_id: String,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_create_request_from_draft() {
    let draft = IssueDraft {
      project_key: "CPG".to_string(),
      summary: "Certificate for maneuver".to_string(),
      description: Some("Line one\nLine two\n\nSecond paragraph".to_string()),
      issue_type: "10003".to_string(),
      parent: Some("CPG-7".to_string()),
      labels: ["certificate".to_string(), "auto".to_string()].into_iter().collect(),
    };

    let json = serde_json::to_value(CreateIssueRequest::from(&draft)).unwrap();
    assert_eq!(
      json,
      json!({
        "fields": {
          "project": {"key": "CPG"},
          "summary": "Certificate for maneuver",
          "description": {
            "type": "doc",
            "version": 1,
            "content": [
              {"type": "paragraph", "content": [
                {"type": "text", "text": "Line one"},
                {"type": "hardBreak"},
                {"type": "text", "text": "Line two"}
              ]},
              {"type": "paragraph", "content": [
                {"type": "text", "text": "Second paragraph"}
              ]}
            ]
          },
          "issuetype": {"id": "10003"},
          "parent": {"key": "CPG-7"},
          "labels": ["auto", "certificate"]
        }
      })
    );
  }

  #[test]
  fn test_minimal_create_request_omits_optional_fields() {
    let draft = IssueDraft {
      project_key: "CPG".to_string(),
      summary: "Bare".to_string(),
      description: None,
      issue_type: "Story".to_string(),
      parent: None,
      labels: BTreeSet::new(),
    };

    let json = serde_json::to_value(CreateIssueRequest::from(&draft)).unwrap();
    assert_eq!(
      json,
      json!({"fields": {"project": {"key": "CPG"}, "summary": "Bare", "issuetype": {"name": "Story"}}})
    );
  }

  #[test]
  fn test_labels_update_is_additive() {
    let labels: BTreeSet<String> = ["b".to_string(), "a".to_string()].into_iter().collect();
    assert_eq!(
      labels_update(&labels),
      json!({"update": {"labels": [{"add": "a"}, {"add": "b"}]}})
    );
  }

  #[test]
  fn test_transition_matching() {
    let transitions: JiraTransitions = serde_json::from_value(json!({
      "transitions": [
        {"id": "11", "name": "Start work", "to": {"name": "In Progress"}},
        {"id": "31", "name": "Done"}
      ]
    }))
    .unwrap();

    assert!(transitions.transitions[0].matches("in progress"));
    assert!(transitions.transitions[0].matches("START WORK"));
    assert!(transitions.transitions[1].matches("done"));
    assert!(transitions.transitions[1].matches("31"));
    assert!(!transitions.transitions[1].matches("Closed"));
  }

  #[test]
  fn test_error_body_summary() {
    let body: JiraErrorBody = serde_json::from_value(json!({
      "errorMessages": ["Something broke"],
      "errors": {"summary": "Field 'summary' is required"}
    }))
    .unwrap();
    assert_eq!(
      body.summary().as_deref(),
      Some("Something broke; summary: Field 'summary' is required")
    );
    assert!(JiraErrorBody::default().summary().is_none());
  }
}
