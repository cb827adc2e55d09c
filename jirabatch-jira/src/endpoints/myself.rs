use reqwest::{Method, StatusCode};
use tracing::instrument;

use crate::client::{JiraClient, error_for_status};
use crate::error::{JiraError, Result};
use crate::models::JiraUser;

impl JiraClient {
  /// Fetch the authenticated user.
  #[instrument(skip(self), level = "debug")]
  pub async fn get_myself(&self) -> Result<JiraUser> {
    let response = self
      .send(self.request(Method::GET, "/myself"), "Failed to connect to Jira")
      .await?;

    match response.status() {
      StatusCode::OK => response
        .json::<JiraUser>()
        .await
        .map_err(|source| JiraError::transport("Failed to parse Jira user", source)),
      _ => Err(error_for_status(response, None).await),
    }
  }
}
