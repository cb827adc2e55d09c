//! # Jira API Client
//!
//! Jira Cloud REST (v3) integration for jirabatch: issue creation, workflow
//! transitions, comments, labels, story points, assignment and attachment
//! uploads, plus the [`JiraTracker`] adapter the batch executor drives.

pub mod auth;
mod client;
pub mod consts;
mod endpoints;
pub mod error;
pub mod models;
pub mod tracker;

pub use auth::{create_jira_client_from_credentials, create_jira_runtime_and_client, get_jira_credentials};
// Re-export the client
pub use client::{JiraClient, create_jira_client};
pub use error::JiraError;
// Re-export models
pub use models::{JiraAuth, JiraField, JiraTransition, JiraUser};
pub use tracker::JiraTracker;
