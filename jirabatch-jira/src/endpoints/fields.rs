use reqwest::{Method, StatusCode};
use tracing::{debug, instrument};

use crate::client::{JiraClient, error_for_status};
use crate::consts::STORY_POINTS_FIELD_NAME;
use crate::error::{JiraError, Result};
use crate::models::JiraField;

impl JiraClient {
  /// List every field known to the instance.
  #[instrument(skip(self), level = "debug")]
  pub async fn get_fields(&self) -> Result<Vec<JiraField>> {
    let response = self
      .send(self.request(Method::GET, "/field"), "Failed to fetch Jira fields")
      .await?;

    match response.status() {
      StatusCode::OK => response
        .json::<Vec<JiraField>>()
        .await
        .map_err(|source| JiraError::transport("Failed to parse Jira fields", source)),
      _ => Err(error_for_status(response, None).await),
    }
  }

  /// Find the id of the story points field by name.
  pub async fn find_story_points_field(&self) -> Result<String> {
    let fields = self.get_fields().await?;
    let field = story_points_field(&fields).ok_or(JiraError::StoryPointsFieldMissing)?;
    debug!("Story points field is {} ({})", field.id, field.name);
    Ok(field.id.clone())
  }
}

/// Prefer an exact "Story Points" match, then any custom field whose name
/// mentions story points.
fn story_points_field(fields: &[JiraField]) -> Option<&JiraField> {
  fields
    .iter()
    .find(|field| field.name.eq_ignore_ascii_case("story points"))
    .or_else(|| {
      fields
        .iter()
        .find(|field| field.custom && field.name.to_lowercase().contains(STORY_POINTS_FIELD_NAME))
    })
}
