//! Weekly timesheet planner: pulls the issues assigned to you from Jira,
//! spreads each weekday across the issues dropped on it and records the
//! result as Tempo worklogs.
//!
//! The browser UI owns drag and drop and calls [`Tracky`].

use log::{info, warn};
use timesheet_api::{Identity, JiraClient, TempoClient, TempoMode};

pub mod bridge;
pub mod config;
pub mod distributor;
pub mod error;
pub mod secrets;
pub mod session;
pub mod submission;

pub use bridge::{
    ErrorPayload, IssueDto, SubmissionSummary, SubmitWeekPayload, WeekChoice, WorklogPreview,
};
pub use config::{Config, ConfigManager};
pub use distributor::{distribute, DistributionSettings, Distributor, WeekAllocation, Weekday};
pub use error::{Result, TimesheetError};
pub use secrets::{SecretKind, SecretsManager};
pub use session::{IssueSource, JiraIssueSource, SessionCache};
pub use submission::{SubmissionResult, Submitter};

/// Installs the process logger. Defaults to `info`; override with `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

/// One user session: Jira-backed issue pool, identity and the configured Tempo writer.
pub struct Tracky {
    submitter: Submitter<JiraIssueSource, TempoClient>,
    mode: TempoMode,
}

impl Tracky {
    /// Reads the config file, `.env` and process environment.
    pub fn from_environment() -> Result<Self> {
        let config = ConfigManager::new()?.load_effective()?;
        Self::new(&config, &SecretsManager::from_env())
    }

    pub fn new(config: &Config, secrets: &SecretsManager) -> Result<Self> {
        config.validate()?;
        let mode = config.tempo_mode()?;

        let jira = JiraClient::new(config.jira_config(secrets.get(SecretKind::JiraToken)?))?;
        let tempo_token = secrets.get(SecretKind::TempoToken)?;
        let tempo = TempoClient::new(mode, config.tempo_config(tempo_token))?;

        if mode == TempoMode::DryRun {
            warn!("Tempo writes are simulated (mode = dry-run)");
        }
        info!("Session ready against {} (mode = {})", config.jira_base_url, mode.as_str());

        let source = JiraIssueSource::new(jira, config.issue_query.clone());
        let cache = SessionCache::new(source, Some(config.cache_ttl()));
        let distributor = Distributor::new(config.distribution_settings()?);

        Ok(Self {
            submitter: Submitter::new(cache, tempo, distributor),
            mode,
        })
    }

    pub fn mode(&self) -> TempoMode {
        self.mode
    }

    pub async fn issues(&self) -> Result<Vec<IssueDto>> {
        let issues = self.submitter.cache().issues().await?;
        Ok(issues.into_iter().map(IssueDto::from).collect())
    }

    pub async fn refresh_issues(&self) -> Result<Vec<IssueDto>> {
        let issues = self.submitter.cache().refresh_issues().await?;
        Ok(issues.into_iter().map(IssueDto::from).collect())
    }

    /// Fuzzy search over the cached pool; a blank query returns all of it.
    pub async fn search_issues(&self, query: &str) -> Result<Vec<IssueDto>> {
        let issues = self.issues().await?;
        Ok(bridge::filter_issues(&issues, query))
    }

    pub fn week_choices(&self) -> Vec<WeekChoice> {
        bridge::week_choices(chrono::Local::now().date_naive())
    }

    pub async fn identity(&self) -> Result<Identity> {
        self.submitter.cache().identity().await
    }

    pub async fn preview_week(&self, payload: &SubmitWeekPayload) -> Result<Vec<WorklogPreview>> {
        let entries = self
            .submitter
            .plan_week(payload.week_start()?, &payload.logs)
            .await?;
        Ok(entries.iter().map(WorklogPreview::from).collect())
    }

    /// The UI resets its day buckets only when this returns `Ok`.
    pub async fn submit_week(&self, payload: &SubmitWeekPayload) -> Result<SubmissionSummary> {
        let result = self
            .submitter
            .submit_week(payload.week_start()?, &payload.logs)
            .await?;
        Ok(SubmissionSummary::new(&result, self.mode == TempoMode::DryRun))
    }
}
