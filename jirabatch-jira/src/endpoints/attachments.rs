//! Attachment uploads.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use tracing::{info, instrument};

use crate::client::{JiraClient, error_for_status};
use crate::consts::{ATLASSIAN_TOKEN_HEADER, ATLASSIAN_TOKEN_NO_CHECK};
use crate::error::{JiraError, Result};
use crate::models::JiraAttachment;

/// MIME type sent for an attachment, by extension.
pub fn mime_type_for(path: &Path) -> &'static str {
  match path.extension().and_then(|ext| ext.to_str()) {
    Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
    _ => "application/octet-stream",
  }
}

impl JiraClient {
  /// Upload a local file to an issue.
  #[instrument(skip(self), level = "debug")]
  pub async fn upload_attachment(&self, issue_key: &str, path: &Path) -> Result<Vec<JiraAttachment>> {
    let bytes = tokio::fs::read(path).await.map_err(|source| JiraError::Io {
      path: path.display().to_string(),
      source,
    })?;
    let file_name = path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| "attachment".to_string());

    info!("Uploading {} ({} bytes) to {}", file_name, bytes.len(), issue_key);

    let part = Part::bytes(bytes)
      .file_name(file_name)
      .mime_str(mime_type_for(path))
      .map_err(|source| JiraError::transport("Invalid attachment MIME type", source))?;
    let form = Form::new().part("file", part);

    let response = self
      .send(
        self
          .request(Method::POST, &format!("/issue/{issue_key}/attachments"))
          .header(ATLASSIAN_TOKEN_HEADER, ATLASSIAN_TOKEN_NO_CHECK)
          .multipart(form),
        "Failed to upload Jira attachment",
      )
      .await?;

    match response.status() {
      StatusCode::OK | StatusCode::CREATED => response
        .json::<Vec<JiraAttachment>>()
        .await
        .map_err(|source| JiraError::transport("Failed to parse attachment response", source)),
      _ => Err(error_for_status(response, Some(issue_key)).await),
    }
  }
}
