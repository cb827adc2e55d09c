use reqwest::{Method, StatusCode};
use tracing::instrument;

use crate::client::{JiraClient, error_for_status};
use crate::error::Result;
use crate::models::{AdfDocument, CommentRequest};

impl JiraClient {
  /// Add a plain-text comment, converted to Atlassian Document Format.
  #[instrument(skip(self, body), level = "debug")]
  pub async fn add_comment(&self, issue_key: &str, body: &str) -> Result<()> {
    let payload = CommentRequest {
      body: AdfDocument::from_text(body),
    };

    let response = self
      .send(
        self
          .request(Method::POST, &format!("/issue/{issue_key}/comment"))
          .json(&payload),
        "Failed to add Jira comment",
      )
      .await?;

    match response.status() {
      StatusCode::CREATED | StatusCode::OK => Ok(()),
      _ => Err(error_for_status(response, Some(issue_key)).await),
    }
  }
}
