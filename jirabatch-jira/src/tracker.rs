//! [`IssueTracker`] backed by the Jira REST client.

use std::collections::BTreeSet;
use std::path::Path;

use jirabatch_core::mapper::IssueDraft;
use jirabatch_core::tracker::{IssueTracker, RemoteError};
use serde_json::json;
use tracing::debug;

use crate::client::JiraClient;
use crate::models::CreateIssueRequest;

/// Applies batch operations to Jira Cloud.
///
/// The story points field id and the caller's account id are looked up on
/// first use and reused for the rest of the run.
pub struct JiraTracker {
  client: JiraClient,
  story_points_field: Option<String>,
  account_id: Option<String>,
}

impl JiraTracker {
  pub fn new(client: JiraClient) -> Self {
    Self {
      client,
      story_points_field: None,
      account_id: None,
    }
  }

  /// Use a known story points field instead of discovering it.
  pub fn with_story_points_field(mut self, field_id: Option<String>) -> Self {
    self.story_points_field = field_id;
    self
  }

  pub const fn client(&self) -> &JiraClient {
    &self.client
  }

  async fn story_points_field(&mut self) -> Result<String, RemoteError> {
    if let Some(field) = &self.story_points_field {
      return Ok(field.clone());
    }
    let field = self.client.find_story_points_field().await?;
    self.story_points_field = Some(field.clone());
    Ok(field)
  }

  async fn account_id(&mut self) -> Result<String, RemoteError> {
    if let Some(account_id) = &self.account_id {
      return Ok(account_id.clone());
    }
    let user = self.client.get_myself().await?;
    debug!("Authenticated as {}", user.account_id);
    self.account_id = Some(user.account_id.clone());
    Ok(user.account_id)
  }
}

impl IssueTracker for JiraTracker {
  async fn create_issue(&mut self, draft: &IssueDraft) -> Result<String, RemoteError> {
    let created = self.client.create_issue(&CreateIssueRequest::from(draft)).await?;
    Ok(created.key)
  }

  async fn transition_issue(&mut self, issue: &str, target: &str) -> Result<(), RemoteError> {
    Ok(self.client.transition_issue_to(issue, target).await?)
  }

  async fn add_comment(&mut self, issue: &str, body: &str) -> Result<(), RemoteError> {
    Ok(self.client.add_comment(issue, body).await?)
  }

  async fn set_labels(&mut self, issue: &str, labels: &BTreeSet<String>) -> Result<(), RemoteError> {
    Ok(self.client.add_labels(issue, labels).await?)
  }

  async fn set_story_points(&mut self, issue: &str, points: u64) -> Result<(), RemoteError> {
    let field = self.story_points_field().await?;
    Ok(self.client.set_field(issue, &field, json!(points)).await?)
  }

  async fn upload_attachment(&mut self, issue: &str, path: &Path) -> Result<(), RemoteError> {
    self.client.upload_attachment(issue, path).await?;
    Ok(())
  }

  async fn assign_to_self(&mut self, issue: &str) -> Result<(), RemoteError> {
    let account_id = self.account_id().await?;
    Ok(self.client.assign_issue(issue, &account_id).await?)
  }
}

#[cfg(test)]
mod tests {
  use jirabatch_core::attachment::CertificateDirResolver;
  use jirabatch_core::executor::{BatchExecutor, RecordState};
  use jirabatch_core::mapper::{MapperOptions, PayloadMapper};
  use jirabatch_test_utils::CertDirGuard;
  use serde_json::json;
  use wiremock::matchers::{body_json, header, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use super::*;
  use crate::client::create_jira_client;

  fn tracker(mock_server: &MockServer) -> JiraTracker {
    JiraTracker::new(create_jira_client(&mock_server.uri(), "test_user", "test_token"))
  }

  #[tokio::test]
  async fn test_story_points_field_is_discovered_once() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/rest/api/3/field"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([
        {"id": "customfield_10016", "name": "Story Points", "custom": true}
      ])))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/rest/api/3/issue/CPG-1"))
      .and(body_json(json!({"fields": {"customfield_10016": 3}})))
      .respond_with(ResponseTemplate::new(204))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/rest/api/3/issue/CPG-2"))
      .and(body_json(json!({"fields": {"customfield_10016": 5}})))
      .respond_with(ResponseTemplate::new(204))
      .expect(1)
      .mount(&mock_server)
      .await;

    let mut tracker = tracker(&mock_server);
    tracker.set_story_points("CPG-1", 3).await?;
    tracker.set_story_points("CPG-2", 5).await?;
    Ok(())
  }

  #[tokio::test]
  async fn test_configured_story_points_field_skips_discovery() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/rest/api/3/field"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
      .expect(0)
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/rest/api/3/issue/CPG-1"))
      .and(body_json(json!({"fields": {"customfield_20000": 8}})))
      .respond_with(ResponseTemplate::new(204))
      .expect(1)
      .mount(&mock_server)
      .await;

    let mut tracker = tracker(&mock_server).with_story_points_field(Some("customfield_20000".to_string()));
    tracker.set_story_points("CPG-1", 8).await?;
    Ok(())
  }

  #[tokio::test]
  async fn test_assign_to_self_uses_account_id() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/rest/api/3/myself"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accountId": "acc-1"})))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/rest/api/3/issue/CPG-1/assignee"))
      .and(body_json(json!({"accountId": "acc-1"})))
      .respond_with(ResponseTemplate::new(204))
      .expect(1)
      .mount(&mock_server)
      .await;

    let mut tracker = tracker(&mock_server);
    tracker.assign_to_self("CPG-1").await?;
    Ok(())
  }

  #[tokio::test]
  async fn test_failed_transition_stops_record() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/rest/api/3/issue/CPG-9/transitions"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "transitions": [{"id": "31", "name": "Done"}]
      })))
      .mount(&mock_server)
      .await;
    Mock::given(method("POST"))
      .and(path("/rest/api/3/issue/CPG-9/comment"))
      .respond_with(ResponseTemplate::new(201))
      .expect(0)
      .mount(&mock_server)
      .await;

    let mut tracker = tracker(&mock_server);
    let mapper = PayloadMapper::new(MapperOptions::default(), None);
    let outcomes = BatchExecutor::new(&mut tracker, &mapper)
      .run(&[json!({"issue": "CPG-9", "status": "In Review", "comment": "moved"})])
      .await;

    assert_eq!(outcomes[0].state, RecordState::Failed);
    let reason = outcomes[0].error.as_ref().map(ToString::to_string).unwrap_or_default();
    assert!(reason.contains("In Review"));
    assert_eq!(outcomes[0].skipped.len(), 1);
    Ok(())
  }

  #[tokio::test]
  async fn test_full_update_record_against_jira() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let certs = CertDirGuard::with_files(&["maneuver_LOW.pdf"]);

    Mock::given(method("GET"))
      .and(path("/rest/api/3/issue/CPG-9/transitions"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "transitions": [{"id": "21", "name": "Start", "to": {"name": "In Progress"}}]
      })))
      .mount(&mock_server)
      .await;
    Mock::given(method("POST"))
      .and(path("/rest/api/3/issue/CPG-9/transitions"))
      .and(body_json(json!({"transition": {"id": "21"}})))
      .respond_with(ResponseTemplate::new(204))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("POST"))
      .and(path("/rest/api/3/issue/CPG-9/comment"))
      .respond_with(ResponseTemplate::new(201))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/rest/api/3/issue/CPG-9"))
      .and(body_json(json!({"update": {"labels": [{"add": "certificate"}]}})))
      .respond_with(ResponseTemplate::new(204))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/rest/api/3/issue/CPG-9"))
      .and(body_json(json!({"fields": {"customfield_10016": 2}})))
      .respond_with(ResponseTemplate::new(204))
      .expect(1)
      .mount(&mock_server)
      .await;
    Mock::given(method("POST"))
      .and(path("/rest/api/3/issue/CPG-9/attachments"))
      .and(header("X-Atlassian-Token", "no-check"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1", "filename": "maneuver_LOW.pdf"}])))
      .expect(1)
      .mount(&mock_server)
      .await;

    let resolver = CertificateDirResolver::new(certs.path(), &["pdf".to_string()]);
    let mapper = PayloadMapper::new(MapperOptions::default(), Some(&resolver));
    let mut tracker = tracker(&mock_server).with_story_points_field(Some("customfield_10016".to_string()));

    let outcomes = BatchExecutor::new(&mut tracker, &mapper)
      .run(&[json!({
        "issue": "CPG-9",
        "status": "in progress",
        "comment": "RTM 4 certificate created.",
        "labels": ["certificate"],
        "points": 2,
        "category": "maneuver",
        "severity": "LOW"
      })])
      .await;

    assert_eq!(outcomes[0].state, RecordState::Succeeded, "{:?}", outcomes[0].error);
    assert_eq!(outcomes[0].results.len(), 5);
    Ok(())
  }
}
