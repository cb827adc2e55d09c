//! Constants for the jirabatch-jira client.

/// User-Agent header value for the Jira API client
pub const USER_AGENT: &str = concat!("jirabatch/", env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Prefix of every REST endpoint used by the client.
pub const API_PREFIX: &str = "/rest/api/3";

/// Header Jira requires on attachment uploads to skip its XSRF check.
pub const ATLASSIAN_TOKEN_HEADER: &str = "X-Atlassian-Token";
pub const ATLASSIAN_TOKEN_NO_CHECK: &str = "no-check";

/// Substring (lowercased) identifying the story points custom field by name.
pub const STORY_POINTS_FIELD_NAME: &str = "story point";
