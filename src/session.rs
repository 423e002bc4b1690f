//! Session-scoped cache for the issue pool and the current identity.

use log::debug;
use std::time::Duration;
use timesheet_api::{Identity, Issue, JiraClient};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::Result;

/// Where the issue pool and identity come from.
#[allow(async_fn_in_trait)]
pub trait IssueSource {
    async fn fetch_assigned_issues(&self) -> Result<Vec<Issue>>;
    async fn fetch_identity(&self) -> Result<Identity>;
}

/// Jira search bound to a configured JQL filter.
#[derive(Clone, Debug)]
pub struct JiraIssueSource {
    client: JiraClient,
    query: String,
}

impl JiraIssueSource {
    pub fn new(client: JiraClient, query: impl Into<String>) -> Self {
        Self {
            client,
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl IssueSource for JiraIssueSource {
    async fn fetch_assigned_issues(&self) -> Result<Vec<Issue>> {
        Ok(self.client.search_issues(&self.query).await?)
    }

    async fn fetch_identity(&self) -> Result<Identity> {
        Ok(self.client.get_myself().await?)
    }
}

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

/// Fetches each value at most once per TTL; callers racing on a cold entry wait for the single fetch.
pub struct SessionCache<S> {
    source: S,
    ttl: Option<Duration>,
    issues: Mutex<Option<Cached<Vec<Issue>>>>,
    identity: Mutex<Option<Cached<Identity>>>,
}

impl<S: IssueSource> SessionCache<S> {
    /// `ttl` of `None` keeps values until [`invalidate`](Self::invalidate).
    pub fn new(source: S, ttl: Option<Duration>) -> Self {
        Self {
            source,
            ttl: ttl.filter(|ttl| !ttl.is_zero()),
            issues: Mutex::new(None),
            identity: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn issues(&self) -> Result<Vec<Issue>> {
        let mut slot = self.issues.lock().await;
        if let Some(cached) = slot.as_ref().filter(|cached| self.is_fresh(cached.fetched_at)) {
            return Ok(cached.value.clone());
        }
        let issues = self.source.fetch_assigned_issues().await?;
        debug!("Cached {} assigned issues", issues.len());
        *slot = Some(Cached {
            value: issues.clone(),
            fetched_at: Instant::now(),
        });
        Ok(issues)
    }

    /// Re-fetches the issue pool regardless of age. The previous pool is kept if the fetch fails.
    pub async fn refresh_issues(&self) -> Result<Vec<Issue>> {
        let mut slot = self.issues.lock().await;
        let issues = self.source.fetch_assigned_issues().await?;
        *slot = Some(Cached {
            value: issues.clone(),
            fetched_at: Instant::now(),
        });
        Ok(issues)
    }

    pub async fn identity(&self) -> Result<Identity> {
        let mut slot = self.identity.lock().await;
        if let Some(cached) = slot.as_ref().filter(|cached| self.is_fresh(cached.fetched_at)) {
            return Ok(cached.value.clone());
        }
        let identity = self.source.fetch_identity().await?;
        *slot = Some(Cached {
            value: identity.clone(),
            fetched_at: Instant::now(),
        });
        Ok(identity)
    }

    pub async fn invalidate(&self) {
        *self.issues.lock().await = None;
        *self.identity.lock().await = None;
    }

    fn is_fresh(&self, fetched_at: Instant) -> bool {
        match self.ttl {
            Some(ttl) => fetched_at.elapsed() < ttl,
            None => true,
        }
    }
}
