//! Jira issue search payloads and their projection into [`Issue`].

use serde::{Deserialize, Serialize};

/// Issue assigned to the current user, reduced to what the week planner shows: ids, title and parent epic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub key: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,
}

/// Body of `GET /rest/api/3/search`. Only the fields below are required; everything else is ignored.
#[derive(Debug, Deserialize)]
pub struct IssueSearchResponse {
    pub issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
pub struct RawIssue {
    pub key: String,
    pub id: String,
    pub fields: RawIssueFields,
}

#[derive(Debug, Deserialize)]
pub struct RawIssueFields {
    pub summary: String,
    #[serde(default)]
    pub parent: Option<RawParent>,
}

#[derive(Debug, Deserialize)]
pub struct RawParent {
    pub fields: RawParentFields,
}

#[derive(Debug, Deserialize)]
pub struct RawParentFields {
    pub summary: String,
}

impl From<RawIssue> for Issue {
    fn from(raw: RawIssue) -> Self {
        Issue {
            id: raw.id,
            key: raw.key,
            title: raw.fields.summary,
            epic: raw.fields.parent.map(|parent| parent.fields.summary),
        }
    }
}

impl IssueSearchResponse {
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues.into_iter().map(Issue::from).collect()
    }
}
