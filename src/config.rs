//! Planner configuration: JSON file in the platform config dir, overridable from the environment.

use chrono::{NaiveTime, Timelike};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use timesheet_api::{Account, JiraConfig, TempoConfig, TempoMode};

use crate::distributor::{DistributionSettings, DEFAULT_DESCRIPTION_TEMPLATE};
use crate::error::{Result, TimesheetError};

static WORKDAY_TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("invalid workday time regex"));

/// Assigned to me, created this year and resolved by the end of this week, or touched this week.
pub const DEFAULT_ISSUE_QUERY: &str = "assignee = currentUser() AND (created >= startOfYear() AND resolutiondate <= endOfWeek() OR updated >= startOfWeek())";

pub const ENV_MODE: &str = "TRACKY_MODE";
pub const ENV_JIRA_BASE_URL: &str = "JIRA_BASE_URL";
pub const ENV_JIRA_EMAIL: &str = "JIRA_EMAIL";
pub const ENV_JIRA_QUERY: &str = "JIRA_QUERY";
pub const ENV_TEMPO_BASE_URL: &str = "TEMPO_BASE_URL";
pub const ENV_ACCOUNT: &str = "TRACKY_ACCOUNT";

fn default_jira_base_url() -> String {
    "https://your-domain.atlassian.net".to_string()
}

fn default_tempo_base_url() -> String {
    timesheet_api::config::DEFAULT_TEMPO_API_BASE.to_string()
}

fn default_workday_hours() -> u8 {
    8
}

/// Default workday start time in `HH:MM` local format.
fn default_workday_start_time() -> String {
    "08:00".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub jira_base_url: String,
    pub jira_email: String,
    pub issue_query: String,
    pub tempo_base_url: String,
    /// `live` or `dry-run`.
    pub mode: String,
    pub default_account: Account,
    #[serde(default = "default_workday_hours")]
    pub workday_hours: u8,
    #[serde(default = "default_workday_start_time")]
    pub workday_start_time: String,
    pub description_template: String,
    pub request_timeout_secs: u64,
    pub request_cooldown_ms: u64,
    pub cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jira_base_url: default_jira_base_url(),
            jira_email: String::new(),
            issue_query: DEFAULT_ISSUE_QUERY.to_string(),
            tempo_base_url: default_tempo_base_url(),
            mode: TempoMode::DryRun.as_str().to_string(),
            default_account: Account::default(),
            workday_hours: default_workday_hours(),
            workday_start_time: default_workday_start_time(),
            description_template: DEFAULT_DESCRIPTION_TEMPLATE.to_string(),
            request_timeout_secs: timesheet_api::config::DEFAULT_TIMEOUT_SECS,
            request_cooldown_ms: timesheet_api::config::DEFAULT_COOLDOWN_MS,
            cache_ttl_secs: 15 * 60,
        }
    }
}

impl Config {
    /// Overlays non-empty values from `lookup` (normally the process environment).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        if let Some(mode) = read(ENV_MODE) {
            self.mode = mode;
        }
        if let Some(url) = read(ENV_JIRA_BASE_URL) {
            self.jira_base_url = url;
        }
        if let Some(email) = read(ENV_JIRA_EMAIL) {
            self.jira_email = email;
        }
        if let Some(query) = read(ENV_JIRA_QUERY) {
            self.issue_query = query;
        }
        if let Some(url) = read(ENV_TEMPO_BASE_URL) {
            self.tempo_base_url = url;
        }
        if let Some(account) = read(ENV_ACCOUNT) {
            match Account::parse(&account) {
                Some(parsed) => self.default_account = parsed,
                None => warn!("Ignoring unknown {} value", ENV_ACCOUNT),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.tempo_mode()?;
        if !is_http_url(&self.jira_base_url) {
            return Err(TimesheetError::configuration("jira_base_url must be an http(s) URL"));
        }
        if !is_http_url(&self.tempo_base_url) {
            return Err(TimesheetError::configuration("tempo_base_url must be an http(s) URL"));
        }
        if self.jira_email.trim().is_empty() {
            return Err(TimesheetError::configuration("jira_email is not set"));
        }
        if self.issue_query.trim().is_empty() {
            return Err(TimesheetError::configuration("issue_query must not be empty"));
        }
        if self.workday_hours == 0 || self.workday_hours > 24 {
            return Err(TimesheetError::configuration("workday_hours must be between 1 and 24"));
        }
        let start = self.day_start()?;
        let end_secs = u64::from(start.num_seconds_from_midnight())
            + u64::from(self.workday_hours) * 3600;
        if end_secs > 24 * 3600 {
            return Err(TimesheetError::configuration(
                "workday_start_time plus workday_hours runs past midnight",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(TimesheetError::configuration("request_timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn tempo_mode(&self) -> Result<TempoMode> {
        TempoMode::parse(&self.mode).ok_or_else(|| {
            TimesheetError::configuration(format!(
                "mode must be `live` or `dry-run`, got `{}`",
                self.mode
            ))
        })
    }

    pub fn day_start(&self) -> Result<NaiveTime> {
        let value = self.workday_start_time.trim();
        let captures = WORKDAY_TIME_REGEX.captures(value).ok_or_else(|| {
            TimesheetError::configuration(format!("workday_start_time `{}` is not HH:MM", value))
        })?;
        let hours = captures[1].parse::<u32>().unwrap_or_default();
        let minutes = captures[2].parse::<u32>().unwrap_or_default();
        NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(|| {
            TimesheetError::configuration(format!("workday_start_time `{}` is out of range", value))
        })
    }

    pub fn distribution_settings(&self) -> Result<DistributionSettings> {
        Ok(DistributionSettings {
            workday_seconds: u32::from(self.workday_hours) * 3600,
            day_start: self.day_start()?,
            account: self.default_account,
            description_template: self.description_template.clone(),
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn jira_config(&self, token: impl Into<String>) -> JiraConfig {
        JiraConfig::new(&self.jira_base_url, &self.jira_email, token)
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_cooldown(Duration::from_millis(self.request_cooldown_ms))
    }

    pub fn tempo_config(&self, token: impl Into<String>) -> TempoConfig {
        TempoConfig::new(token)
            .with_base_url(&self.tempo_base_url)
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_cooldown(Duration::from_millis(self.request_cooldown_ms))
    }
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("https://") || value.starts_with("http://")
}

/// Loads and saves [`Config`] as JSON in the platform-specific config directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("io", "tracky", "tracky").ok_or_else(|| {
            TimesheetError::configuration("could not determine the config directory")
        })?;
        Ok(Self {
            path: dirs.config_dir().join("config.json"),
        })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads config from disk, falling back to defaults on read/parse errors.
    pub fn load(&self) -> Config {
        if !self.path.exists() {
            return Config::default();
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                warn!("Ignoring unreadable config at {}: {}", self.path.display(), err);
                Config::default()
            }),
            Err(err) => {
                warn!("Failed to read config at {}: {}", self.path.display(), err);
                Config::default()
            }
        }
    }

    /// File values, then `.env`, then process environment; validated.
    pub fn load_effective(&self) -> Result<Config> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        let mut config = self.load();
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Persists config to disk, creating parent directories when needed.
    pub fn save(&self, config: &Config) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        env::temp_dir().join(format!("tracky-tests-{name}-{nanos}/config.json"))
    }

    fn valid() -> Config {
        Config {
            jira_email: "me@acme.test".to_string(),
            jira_base_url: "https://acme.atlassian.net".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.workday_hours, 8);
        assert_eq!(config.workday_start_time, "08:00");
        assert_eq!(config.mode, "dry-run");
        assert_eq!(config.default_account, Account::KpmgFunds);
        assert_eq!(config.description_template, "Did work on {title}");
        assert!(config.issue_query.contains("currentUser()"));
    }

    #[test]
    fn load_missing_file_returns_default() {
        let manager = ConfigManager::with_path(unique_path("missing"));
        assert_eq!(manager.load(), Config::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = unique_path("roundtrip");
        let parent = path.parent().map(ToOwned::to_owned);
        let manager = ConfigManager::with_path(path.clone());
        let config = Config {
            mode: "live".to_string(),
            default_account: Account::Internal,
            workday_hours: 7,
            workday_start_time: "09:15".to_string(),
            ..valid()
        };

        manager.save(&config).expect("save should succeed");
        assert_eq!(manager.load(), config);

        if let Some(parent) = parent {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn load_invalid_json_falls_back_to_default() {
        let path = unique_path("invalid");
        let parent = path.parent().expect("parent must exist");
        fs::create_dir_all(parent).expect("create temp directory");
        fs::write(&path, "not-valid-json").expect("write invalid config");

        let loaded = ConfigManager::with_path(path.clone()).load();
        assert_eq!(loaded.workday_start_time, "08:00");

        let _ = fs::remove_dir_all(parent);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let parsed: Config =
            serde_json::from_str(r#"{"jira_email":"me@acme.test","default_account":"INTERNAL"}"#)
                .expect("partial config parses");
        assert_eq!(parsed.default_account, Account::Internal);
        assert_eq!(parsed.workday_hours, 8);
        assert_eq!(parsed.issue_query, DEFAULT_ISSUE_QUERY);
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_MODE, "live"),
            (ENV_JIRA_EMAIL, "other@acme.test"),
            (ENV_JIRA_QUERY, "  "),
            (ENV_ACCOUNT, "internal"),
        ]);
        let mut config = valid();
        config.apply_env_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.tempo_mode().unwrap(), TempoMode::Live);
        assert_eq!(config.jira_email, "other@acme.test");
        assert_eq!(config.issue_query, DEFAULT_ISSUE_QUERY);
        assert_eq!(config.default_account, Account::Internal);
    }

    #[test]
    fn validate_rejects_bad_settings() {
        assert!(valid().validate().is_ok());

        let cases = [
            Config { mode: "sometimes".into(), ..valid() },
            Config { jira_email: " ".into(), ..valid() },
            Config { issue_query: "".into(), ..valid() },
            Config { workday_hours: 0, ..valid() },
            Config { workday_start_time: "8am".into(), ..valid() },
            Config { workday_start_time: "20:00".into(), ..valid() },
            Config { jira_base_url: "acme.atlassian.net".into(), ..valid() },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(TimesheetError::Configuration(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn distribution_settings_follow_workday() {
        let config = Config {
            workday_hours: 6,
            workday_start_time: "09:30".into(),
            ..valid()
        };
        let settings = config.distribution_settings().unwrap();
        assert_eq!(settings.workday_seconds, 21_600);
        assert_eq!(settings.day_start, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn client_configs_carry_timeouts() {
        let config = Config {
            request_timeout_secs: 12,
            ..valid()
        };
        let jira = config.jira_config("t");
        assert_eq!(jira.timeout, Duration::from_secs(12));
        assert_eq!(jira.api_root(), "https://acme.atlassian.net/rest/api/3/");
        let tempo = config.tempo_config("t");
        assert_eq!(tempo.api_root(), "https://api.tempo.io/4/");
    }
}
