//! Serialized payload shapes exchanged with the browser UI.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use timesheet_api::{Account, Issue, WorklogEntry};

use crate::distributor::WeekAllocation;
use crate::error::{Result, TimesheetError};
use crate::submission::SubmissionResult;

/// Draggable issue card.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IssueDto {
    pub id: String,
    pub key: String,
    pub title: String,
    pub epic: Option<String>,
    pub label: String,
}

impl From<Issue> for IssueDto {
    fn from(issue: Issue) -> Self {
        let label = format!("{} {}", issue.key, issue.title);
        Self {
            id: issue.id,
            key: issue.key,
            title: issue.title,
            epic: issue.epic,
            label,
        }
    }
}

/// Week the user built by dropping issues onto days.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubmitWeekPayload {
    #[serde(rename = "startOfWeek", alias = "week_start")]
    pub start_of_week: String,
    pub logs: WeekAllocation,
}

impl SubmitWeekPayload {
    pub fn week_start(&self) -> Result<NaiveDate> {
        parse_week_start(&self.start_of_week)
    }
}

/// Week starts travel as calendar dates (`yyyy-MM-dd`). Timestamps are rejected: a UTC
/// instant for a local Monday midnight east of Greenwich falls on Sunday.
pub fn parse_week_start(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        TimesheetError::invalid_input(format!("`{}` is not a yyyy-MM-dd date", value))
    })
}

/// Matches at or above this Jaro-Winkler similarity count as hits.
const SEARCH_THRESHOLD: f64 = 0.85;

/// Fuzzy search over issue titles and epics, best match first. A blank query returns the pool unchanged.
///
/// A field containing the query anywhere is a perfect hit; otherwise the
/// query is compared against the whole field and each of its words.
pub fn filter_issues(issues: &[IssueDto], query: &str) -> Vec<IssueDto> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return issues.to_vec();
    }

    let mut scored: Vec<(f64, &IssueDto)> = issues
        .iter()
        .filter_map(|issue| {
            let score = issue_score(&query, issue);
            (score >= SEARCH_THRESHOLD).then_some((score, issue))
        })
        .collect();
    // stable: equal scores keep pool order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, issue)| issue.clone()).collect()
}

fn issue_score(query: &str, issue: &IssueDto) -> f64 {
    [Some(issue.title.as_str()), issue.epic.as_deref()]
        .into_iter()
        .flatten()
        .map(|field| field_score(query, field))
        .fold(0.0, f64::max)
}

fn field_score(query: &str, field: &str) -> f64 {
    let field = field.to_lowercase();
    if field.contains(query) {
        return 1.0;
    }
    field
        .split_whitespace()
        .map(|word| strsim::jaro_winkler(query, word))
        .fold(strsim::jaro_winkler(query, &field), f64::max)
}

/// Monday of the week containing `today`.
pub fn current_week_start(today: NaiveDate) -> NaiveDate {
    let back = u64::from(today.weekday().num_days_from_monday());
    today.checked_sub_days(Days::new(back)).unwrap_or(today)
}

/// This week's Monday and the two before it, oldest first.
pub fn recent_week_starts(today: NaiveDate) -> Vec<NaiveDate> {
    let current = current_week_start(today);
    (0..=2u64)
        .rev()
        .filter_map(|weeks_back| current.checked_sub_days(Days::new(weeks_back * 7)))
        .collect()
}

/// Entry in the week picker. `selected` marks the current week, the default choice.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekChoice {
    pub week_start: String,
    pub label: String,
    pub selected: bool,
}

pub fn week_choices(today: NaiveDate) -> Vec<WeekChoice> {
    let current = current_week_start(today);
    recent_week_starts(today)
        .into_iter()
        .map(|start| WeekChoice {
            week_start: start.format("%Y-%m-%d").to_string(),
            label: week_label(start),
            selected: start == current,
        })
        .collect()
}

/// `January 1st` style.
fn week_label(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {}{}", date.format("%B"), day, suffix)
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPreview {
    pub issue_id: String,
    pub start_date: String,
    pub start_time: String,
    pub time_spent_seconds: u32,
    pub description: String,
    pub account: Account,
}

impl From<&WorklogEntry> for WorklogPreview {
    fn from(entry: &WorklogEntry) -> Self {
        Self {
            issue_id: entry.issue_id.clone(),
            start_date: entry.start_date_string(),
            start_time: entry.start_time_string(),
            time_spent_seconds: entry.time_spent_seconds,
            description: entry.description.clone(),
            account: entry.account,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub submitted: usize,
    pub dry_run: bool,
    pub worklog_ids: Vec<Value>,
}

impl SubmissionSummary {
    pub fn new(result: &SubmissionResult, dry_run: bool) -> Self {
        Self {
            submitted: result.len(),
            dry_run,
            worklog_ids: result
                .acknowledgements
                .iter()
                .map(|ack| ack.id.clone().unwrap_or(Value::Null))
                .collect(),
        }
    }
}

/// Error shown by the UI. `committed` is set when part of a week was already recorded.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committed: Option<usize>,
}

impl From<&TimesheetError> for ErrorPayload {
    fn from(err: &TimesheetError) -> Self {
        let (kind, committed) = match err {
            TimesheetError::Configuration(_) => ("configuration", None),
            TimesheetError::Validation(_) => ("validation", None),
            TimesheetError::InvalidInput(_) => ("invalid_input", None),
            TimesheetError::NotFound(_) => ("not_found", None),
            TimesheetError::Transport(_) => ("transport", None),
            TimesheetError::Aborted { committed, .. } => ("aborted", Some(committed.len())),
        };
        Self {
            kind,
            message: err.to_string(),
            committed,
        }
    }
}
