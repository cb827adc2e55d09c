//! Constants shared across jirabatch components.

/// Environment variable for the Jira host URL.
pub const ENV_JIRA_HOST: &str = "JIRA_HOST";

/// Environment variable naming the account email used with an API token.
pub const ENV_JIRA_EMAIL: &str = "JIRA_EMAIL";

/// Environment variable holding a Jira API token.
pub const ENV_JIRA_API_TOKEN: &str = "JIRA_API_TOKEN";

/// Environment variable overriding the certificate directory.
pub const ENV_CERT_DIR: &str = "JIRABATCH_CERT_DIR";

/// Environment variable overriding the project key for new issues.
pub const ENV_PROJECT: &str = "JIRABATCH_PROJECT";

/// Fallback `.netrc` machine for Jira Cloud credentials.
pub const DEFAULT_JIRA_MACHINE: &str = "atlassian.net";
