//! API token lookup: environment first, OS keyring second.

use keyring::{Entry, Error as KeyringError};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, TimesheetError};

const KEYRING_SERVICE: &str = "io.tracky";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecretKind {
    JiraToken,
    TempoToken,
}

impl SecretKind {
    /// Preferred name first; the short legacy names are still honoured.
    pub fn env_names(&self) -> [&'static str; 2] {
        match self {
            SecretKind::JiraToken => ["JIRA_API_TOKEN", "JIRA"],
            SecretKind::TempoToken => ["TEMPO_API_TOKEN", "TEMPO"],
        }
    }

    fn keyring_account(&self) -> &'static str {
        match self {
            SecretKind::JiraToken => "jira-api-token",
            SecretKind::TempoToken => "tempo-api-token",
        }
    }
}

#[derive(Clone)]
pub struct SecretsManager {
    inner: Arc<SecretsInner>,
}

struct SecretsInner {
    keyring_service: Option<String>,
    resolved: Mutex<HashMap<SecretKind, String>>,
}

impl SecretsManager {
    /// Snapshots tokens from the environment (after `.env`) and falls back to the keyring for anything missing.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok(), Some(KEYRING_SERVICE.to_string()))
    }

    /// Fixed tokens, no keyring access.
    pub fn with_tokens(jira: Option<&str>, tempo: Option<&str>) -> Self {
        let mut resolved = HashMap::new();
        for (kind, value) in [(SecretKind::JiraToken, jira), (SecretKind::TempoToken, tempo)] {
            if let Some(token) = value.map(str::trim).filter(|token| !token.is_empty()) {
                resolved.insert(kind, token.to_string());
            }
        }
        Self::from_resolved(resolved, None)
    }

    pub fn from_lookup<F>(lookup: F, keyring_service: Option<String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut resolved = HashMap::new();
        for kind in [SecretKind::JiraToken, SecretKind::TempoToken] {
            let found = kind
                .env_names()
                .iter()
                .filter_map(|name| lookup(*name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty());
            if let Some(token) = found {
                resolved.insert(kind, token);
            }
        }
        Self::from_resolved(resolved, keyring_service)
    }

    fn from_resolved(resolved: HashMap<SecretKind, String>, keyring_service: Option<String>) -> Self {
        SecretsManager {
            inner: Arc::new(SecretsInner {
                keyring_service,
                resolved: Mutex::new(resolved),
            }),
        }
    }

    pub fn has(&self, kind: SecretKind) -> bool {
        self.get(kind).is_ok()
    }

    /// Fails with `Configuration` when the token is neither in the environment nor the keyring.
    pub fn get(&self, kind: SecretKind) -> Result<String> {
        if let Some(token) = self.resolved().get(&kind) {
            return Ok(token.clone());
        }
        match self.load_from_keyring(kind)? {
            Some(token) => {
                debug!("Loaded {:?} from keyring", kind);
                self.resolved().insert(kind, token.clone());
                Ok(token)
            }
            None => Err(TimesheetError::configuration(format!(
                "{} environment variable not set",
                kind.env_names()[0]
            ))),
        }
    }

    /// Stores a token in the keyring and uses it for the rest of the session.
    pub fn store(&self, kind: SecretKind, token: &str) -> Result<()> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(TimesheetError::configuration("token must not be empty"));
        }
        if let Some(entry) = self.entry(kind)? {
            entry.set_password(trimmed).map_err(|err| {
                TimesheetError::configuration(format!("Failed to store token in keyring: {err}"))
            })?;
        }
        self.resolved().insert(kind, trimmed.to_string());
        Ok(())
    }

    pub fn clear(&self, kind: SecretKind) -> Result<()> {
        if let Some(entry) = self.entry(kind)? {
            match entry.delete_credential() {
                Ok(()) | Err(KeyringError::NoEntry) => {}
                Err(err) => {
                    return Err(TimesheetError::configuration(format!(
                        "Failed to delete token from keyring: {err}"
                    )))
                }
            }
        }
        self.resolved().remove(&kind);
        Ok(())
    }

    fn resolved(&self) -> std::sync::MutexGuard<'_, HashMap<SecretKind, String>> {
        self.inner
            .resolved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load_from_keyring(&self, kind: SecretKind) -> Result<Option<String>> {
        let Some(entry) = self.entry(kind)? else {
            return Ok(None);
        };
        match entry.get_password() {
            Ok(secret) => Ok(Some(secret).filter(|value| !value.trim().is_empty())),
            Err(KeyringError::NoEntry) => Ok(None),
            Err(err) => Err(TimesheetError::configuration(format!(
                "Failed to read token from keyring: {err}"
            ))),
        }
    }

    fn entry(&self, kind: SecretKind) -> Result<Option<Entry>> {
        let Some(service) = &self.inner.keyring_service else {
            return Ok(None);
        };
        Entry::new(service, kind.keyring_account())
            .map(Some)
            .map_err(|err| TimesheetError::configuration(format!("Failed to open keyring entry: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn preferred_env_name_wins_over_legacy() {
        let vars = HashMap::from([("JIRA_API_TOKEN", "new"), ("JIRA", "old"), ("TEMPO", "legacy")]);
        let secrets = SecretsManager::from_lookup(|name| vars.get(name).map(|v| v.to_string()), None);

        assert_eq!(secrets.get(SecretKind::JiraToken).unwrap(), "new");
        assert_eq!(secrets.get(SecretKind::TempoToken).unwrap(), "legacy");
    }

    #[test]
    fn blank_env_value_counts_as_missing() {
        let secrets = SecretsManager::from_lookup(
            |name| (name == "TEMPO_API_TOKEN").then(|| "   ".to_string()),
            None,
        );
        let err = secrets.get(SecretKind::TempoToken).unwrap_err();
        assert!(matches!(err, TimesheetError::Configuration(_)));
        assert!(err.to_string().contains("TEMPO_API_TOKEN"));
        assert!(!secrets.has(SecretKind::JiraToken));
    }

    #[test]
    fn store_and_clear_without_keyring_stay_in_memory() {
        let secrets = SecretsManager::with_tokens(None, Some("t"));
        secrets.store(SecretKind::JiraToken, " j ").unwrap();
        assert_eq!(secrets.get(SecretKind::JiraToken).unwrap(), "j");

        secrets.clear(SecretKind::JiraToken).unwrap();
        assert!(secrets.get(SecretKind::JiraToken).is_err());
        assert!(secrets.store(SecretKind::TempoToken, "").is_err());
    }
}
