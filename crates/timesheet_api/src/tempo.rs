//! Tempo worklog writers: the live REST client and a local dry-run stand-in.

use serde_json::Value;
use tracing::{debug, info};

use crate::config::{TempoConfig, TempoMode};
use crate::error::{ApiError, Result};
use crate::http::{ApiHttp, HttpSettings};
use crate::models::{WorklogAck, WorklogEntry};

/// Identifier stamped on acknowledgements produced without reaching Tempo.
pub const DRY_RUN_WORKLOG_ID: u64 = 1;

/// Capability to record one worklog entry somewhere. One call creates at most one record; there is no idempotency key.
#[allow(async_fn_in_trait)]
pub trait WorklogWriter {
    async fn create_worklog(&self, entry: &WorklogEntry) -> Result<WorklogAck>;
}

#[derive(Clone, Debug)]
pub struct LiveTempoClient {
    http: ApiHttp,
}

impl LiveTempoClient {
    /// Builds a client authenticating with `Bearer {token}`.
    pub fn new(config: TempoConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(ApiError::Configuration("Tempo API token is not set".into()));
        }
        let http = ApiHttp::new(HttpSettings {
            api_root: config.api_root(),
            authorization: format!("Bearer {}", config.token.trim()),
            user_agent: &config.user_agent,
            timeout: config.timeout,
            connect_timeout: config.connect_timeout,
            cooldown: config.cooldown,
        })?;
        Ok(Self { http })
    }
}

impl WorklogWriter for LiveTempoClient {
    async fn create_worklog(&self, entry: &WorklogEntry) -> Result<WorklogAck> {
        let body: Value = self.http.post_json("worklogs", &entry.to_request()).await?;
        let ack = WorklogAck::from_body(body);
        debug!(issue_id = %entry.issue_id, worklog_id = ?ack.id, "worklog created");
        Ok(ack)
    }
}

/// Echoes the request body back with a fixed id and never touches the network.
#[derive(Clone, Debug, Default)]
pub struct DryRunTempoClient;

impl DryRunTempoClient {
    pub fn new() -> Self {
        Self
    }
}

impl WorklogWriter for DryRunTempoClient {
    async fn create_worklog(&self, entry: &WorklogEntry) -> Result<WorklogAck> {
        let mut body = serde_json::to_value(entry.to_request())?;
        if let Value::Object(map) = &mut body {
            map.insert("id".to_string(), Value::from(DRY_RUN_WORKLOG_ID));
        }
        info!(
            issue_id = %entry.issue_id,
            start_date = %entry.start_date_string(),
            seconds = entry.time_spent_seconds,
            "dry-run: worklog not sent"
        );
        Ok(WorklogAck::from_body(body))
    }
}

/// Writer picked from configuration.
#[derive(Clone, Debug)]
pub enum TempoClient {
    Live(LiveTempoClient),
    DryRun(DryRunTempoClient),
}

impl TempoClient {
    /// A token is required in both modes, so a dry run catches a missing secret before going live.
    pub fn new(mode: TempoMode, config: TempoConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(ApiError::Configuration("Tempo API token is not set".into()));
        }
        match mode {
            TempoMode::Live => LiveTempoClient::new(config).map(TempoClient::Live),
            TempoMode::DryRun => Ok(TempoClient::DryRun(DryRunTempoClient::new())),
        }
    }

    pub fn mode(&self) -> TempoMode {
        match self {
            TempoClient::Live(_) => TempoMode::Live,
            TempoClient::DryRun(_) => TempoMode::DryRun,
        }
    }
}

impl WorklogWriter for TempoClient {
    async fn create_worklog(&self, entry: &WorklogEntry) -> Result<WorklogAck> {
        match self {
            TempoClient::Live(client) => client.create_worklog(entry).await,
            TempoClient::DryRun(client) => client.create_worklog(entry).await,
        }
    }
}
