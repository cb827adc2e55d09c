use reqwest::{Method, StatusCode};
use tracing::{info, instrument};

use crate::client::{JiraClient, error_for_status};
use crate::error::{JiraError, Result};
use crate::models::{JiraTransition, JiraTransitions, TransitionId, TransitionRequest};

impl JiraClient {
  /// Get available transitions for an issue
  #[instrument(skip(self), level = "debug")]
  pub async fn get_transitions(&self, issue_key: &str) -> Result<Vec<JiraTransition>> {
    let response = self
      .send(
        self.request(Method::GET, &format!("/issue/{issue_key}/transitions")),
        "Failed to fetch Jira transitions",
      )
      .await?;

    match response.status() {
      StatusCode::OK => {
        let transitions = response
          .json::<JiraTransitions>()
          .await
          .map_err(|source| JiraError::transport("Failed to parse Jira transitions", source))?;
        Ok(transitions.transitions)
      }
      _ => Err(error_for_status(response, Some(issue_key)).await),
    }
  }

  /// Transition an issue by transition id
  #[instrument(skip(self), level = "debug")]
  pub async fn transition_issue(&self, issue_key: &str, transition_id: &str) -> Result<()> {
    let payload = TransitionRequest {
      transition: TransitionId {
        id: transition_id.to_string(),
      },
    };

    let response = self
      .send(
        self
          .request(Method::POST, &format!("/issue/{issue_key}/transitions"))
          .json(&payload),
        "Failed to transition Jira issue",
      )
      .await?;

    match response.status() {
      StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
      StatusCode::BAD_REQUEST => Err(JiraError::InvalidTransition),
      _ => Err(error_for_status(response, Some(issue_key)).await),
    }
  }

  /// Move an issue to the status named `target`.
  ///
  /// The name is matched case-insensitively against both the transition name
  /// and the status it leads to.
  pub async fn transition_issue_to(&self, issue_key: &str, target: &str) -> Result<()> {
    let transitions = self.get_transitions(issue_key).await?;

    let Some(transition) = transitions.iter().find(|t| t.matches(target)) else {
      let available: Vec<&str> = transitions.iter().map(|t| t.name.as_str()).collect();
      return Err(JiraError::UnknownTransition {
        issue: issue_key.to_string(),
        target: target.to_string(),
        available: available.join(", "),
      });
    };

    info!("Transitioning {} via '{}' ({})", issue_key, transition.name, transition.id);
    self.transition_issue(issue_key, &transition.id).await
  }
}
