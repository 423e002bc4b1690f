//! Jira REST client: assigned-issue search and the authenticated identity.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use tracing::debug;

use crate::config::JiraConfig;
use crate::error::{ApiError, Result};
use crate::http::{ApiHttp, HttpSettings};
use crate::models::{Identity, Issue, IssueSearchResponse};

const SEARCH_FIELDS: &str = "summary,parent";

#[derive(Clone, Debug)]
pub struct JiraClient {
    http: ApiHttp,
    config: JiraConfig,
}

impl JiraClient {
    /// Builds a client authenticating with Basic `email:token`.
    pub fn new(config: JiraConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(ApiError::Configuration("Jira API token is not set".into()));
        }
        if config.email.trim().is_empty() {
            return Err(ApiError::Configuration("Jira account email is not set".into()));
        }

        let credentials = format!("{}:{}", config.email.trim(), config.token.trim());
        let http = ApiHttp::new(HttpSettings {
            api_root: config.api_root(),
            authorization: format!("Basic {}", BASE64_STANDARD.encode(credentials)),
            user_agent: &config.user_agent,
            timeout: config.timeout,
            connect_timeout: config.connect_timeout,
            cooldown: config.cooldown,
        })?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    /// Runs a JQL search and projects each hit into an [`Issue`]. Hits missing `key`, `id` or `fields.summary` fail the whole call.
    pub async fn search_issues(&self, jql: &str) -> Result<Vec<Issue>> {
        let jql = jql.trim();
        if jql.is_empty() {
            return Err(ApiError::Configuration("issue query must not be empty".into()));
        }
        let response: IssueSearchResponse = self
            .http
            .get_json("search", &[("jql", jql), ("fields", SEARCH_FIELDS)])
            .await?;
        let issues = response.into_issues();
        debug!(count = issues.len(), "fetched assigned issues");
        Ok(issues)
    }

    pub async fn get_myself(&self) -> Result<Identity> {
        self.http.get_json("myself", &[]).await
    }
}
