//! Typed clients for the two services a weekly timesheet touches: Jira (issues, identity) and Tempo (worklogs).

pub mod config;
pub mod error;
mod http;
pub mod jira;
pub mod models;
pub mod pacing;
pub mod tempo;

pub use config::{JiraConfig, TempoConfig, TempoMode};
pub use error::{ApiError, Result};
pub use jira::JiraClient;
pub use models::{Account, Identity, Issue, WorklogAck, WorklogEntry};
pub use tempo::{DryRunTempoClient, LiveTempoClient, TempoClient, WorklogWriter, DRY_RUN_WORKLOG_ID};
