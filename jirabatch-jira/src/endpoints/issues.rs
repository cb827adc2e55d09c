//! # Jira Issue Endpoints
//!
//! Issue creation and in-place edits: labels, arbitrary fields, assignee.

use std::collections::BTreeSet;

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::client::{JiraClient, error_for_status};
use crate::error::{JiraError, Result};
use crate::models::{AssigneeRequest, CreateIssueRequest, CreatedIssue, labels_update};

impl JiraClient {
  /// Create an issue and return its id and key.
  #[instrument(skip(self, request), level = "debug")]
  pub async fn create_issue(&self, request: &CreateIssueRequest) -> Result<CreatedIssue> {
    info!(
      "Creating issue in {}: {}",
      request.fields.project.key, request.fields.summary
    );

    let response = self
      .send(
        self.request(Method::POST, "/issue").json(request),
        "Failed to create Jira issue",
      )
      .await?;

    match response.status() {
      StatusCode::CREATED | StatusCode::OK => response
        .json::<CreatedIssue>()
        .await
        .map_err(|source| JiraError::transport("Failed to parse created issue", source)),
      _ => Err(error_for_status(response, None).await),
    }
  }

  /// Add labels to an issue, keeping the ones it already has.
  #[instrument(skip(self), level = "debug")]
  pub async fn add_labels(&self, issue_key: &str, labels: &BTreeSet<String>) -> Result<()> {
    self.edit_issue(issue_key, &labels_update(labels)).await
  }

  /// Set a single field, e.g. a story points custom field.
  #[instrument(skip(self, value), level = "debug")]
  pub async fn set_field(&self, issue_key: &str, field_id: &str, value: Value) -> Result<()> {
    let mut fields = serde_json::Map::new();
    fields.insert(field_id.to_string(), value);
    self.edit_issue(issue_key, &json!({ "fields": fields })).await
  }

  /// Assign an issue to the given account.
  #[instrument(skip(self), level = "debug")]
  pub async fn assign_issue(&self, issue_key: &str, account_id: &str) -> Result<()> {
    let payload = AssigneeRequest {
      account_id: account_id.to_string(),
    };

    let response = self
      .send(
        self
          .request(Method::PUT, &format!("/issue/{issue_key}/assignee"))
          .json(&payload),
        "Failed to assign Jira issue",
      )
      .await?;

    match response.status() {
      StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
      _ => Err(error_for_status(response, Some(issue_key)).await),
    }
  }

  async fn edit_issue(&self, issue_key: &str, payload: &Value) -> Result<()> {
    let response = self
      .send(
        self.request(Method::PUT, &format!("/issue/{issue_key}")).json(payload),
        "Failed to update Jira issue",
      )
      .await?;

    match response.status() {
      StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
      _ => Err(error_for_status(response, Some(issue_key)).await),
    }
  }
}
