//! Worklog entries produced by the planner and the Tempo wire body they become.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ACCOUNT_ATTRIBUTE_KEY: &str = "_Account_";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Cost-center tag attached to each worklog through the `_Account_` work attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Account {
    #[default]
    #[serde(rename = "KPMG-FUNDS")]
    KpmgFunds,
    #[serde(rename = "INTERNAL")]
    Internal,
}

impl Account {
    pub fn as_str(&self) -> &'static str {
        match self {
            Account::KpmgFunds => "KPMG-FUNDS",
            Account::Internal => "INTERNAL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "KPMG-FUNDS" => Some(Account::KpmgFunds),
            "INTERNAL" => Some(Account::Internal),
            _ => None,
        }
    }
}

/// One block of time on one issue on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogEntry {
    pub issue_id: String,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub time_spent_seconds: u32,
    pub description: String,
    pub account: Account,
    pub author_account_id: String,
}

impl WorklogEntry {
    pub fn start_date_string(&self) -> String {
        self.start_date.format(DATE_FORMAT).to_string()
    }

    pub fn start_time_string(&self) -> String {
        self.start_time.format(TIME_FORMAT).to_string()
    }

    pub fn to_request(&self) -> WorklogRequest<'_> {
        WorklogRequest {
            author_account_id: &self.author_account_id,
            issue_id: WireIssueId::from(self.issue_id.as_str()),
            start_date: self.start_date_string(),
            start_time: self.start_time_string(),
            time_spent_seconds: self.time_spent_seconds,
            description: &self.description,
            attributes: vec![WorklogAttribute {
                key: ACCOUNT_ATTRIBUTE_KEY,
                value: self.account.as_str(),
            }],
        }
    }
}

/// Body of `POST /4/worklogs`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogRequest<'a> {
    pub author_account_id: &'a str,
    pub issue_id: WireIssueId<'a>,
    pub start_date: String,
    pub start_time: String,
    pub time_spent_seconds: u32,
    pub description: &'a str,
    pub attributes: Vec<WorklogAttribute<'a>>,
}

#[derive(Debug, Serialize)]
pub struct WorklogAttribute<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Tempo expects numeric issue ids; Jira hands them out as numeric strings.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WireIssueId<'a> {
    Numeric(u64),
    Text(&'a str),
}

impl<'a> From<&'a str> for WireIssueId<'a> {
    fn from(value: &'a str) -> Self {
        match value.trim().parse::<u64>() {
            Ok(number) => WireIssueId::Numeric(number),
            Err(_) => WireIssueId::Text(value),
        }
    }
}

/// Acknowledgement for one created worklog, carrying the raw response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorklogAck {
    pub id: Option<Value>,
    pub body: Value,
}

impl WorklogAck {
    /// Reads `tempoWorklogId`, falling back to `id`.
    pub fn from_body(body: Value) -> Self {
        let id = body
            .get("tempoWorklogId")
            .or_else(|| body.get("id"))
            .filter(|value| !value.is_null())
            .cloned();
        Self { id, body }
    }
}
