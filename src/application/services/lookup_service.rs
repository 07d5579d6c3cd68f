//! State and mandi lookups with a hardcoded fallback
//!
//! Transient connection failures are retried with backoff. If the database
//! stays unreachable the built-in lists are served and marked as such;
//! any other error is returned to the caller.

use std::sync::Arc;

use tracing::warn;

use crate::domain::location::{fallback, Mandi, State};
use crate::domain::repositories::RepositoryProvider;
use crate::shared::{retry_with_backoff, DomainError, DomainResult, RetryConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Database,
    Fallback,
}

impl LookupSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupSource::Database => "database",
            LookupSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<T> {
    pub data: Vec<T>,
    pub source: LookupSource,
    pub warning: Option<String>,
}

impl<T> Lookup<T> {
    fn database(data: Vec<T>) -> Self {
        Self { data, source: LookupSource::Database, warning: None }
    }

    fn fallback(data: Vec<T>, cause: &DomainError) -> Self {
        Self {
            data,
            source: LookupSource::Fallback,
            warning: Some(format!("Database unavailable, serving built-in list ({cause})")),
        }
    }
}

pub struct LookupService {
    repos: Arc<dyn RepositoryProvider>,
    retry: RetryConfig,
}

impl LookupService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos, retry: RetryConfig::default() }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub async fn states(&self) -> DomainResult<Lookup<State>> {
        let result = retry_with_backoff(
            self.retry.clone(),
            || self.repos.locations().list_states(),
            DomainError::is_transient,
            "list_states",
        )
        .await;

        match result {
            Ok(states) => Ok(Lookup::database(states)),
            Err(e) if e.is_transient() => {
                warn!(error = %e, "Serving fallback state list");
                Ok(Lookup::fallback(fallback::states(), &e))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn mandis(&self, state_id: Option<i32>) -> DomainResult<Lookup<Mandi>> {
        let result = retry_with_backoff(
            self.retry.clone(),
            || self.repos.locations().list_mandis(state_id),
            DomainError::is_transient,
            "list_mandis",
        )
        .await;

        match result {
            Ok(mandis) => Ok(Lookup::database(mandis)),
            Err(e) if e.is_transient() => {
                warn!(error = %e, state_id, "Serving fallback mandi list");
                Ok(Lookup::fallback(fallback::mandis(state_id), &e))
            }
            Err(e) => Err(e),
        }
    }
}
