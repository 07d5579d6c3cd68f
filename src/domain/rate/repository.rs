//! Rate repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{DailyAverage, NewRate, PricePoint, Rate, RateFilter, RateListing, RatePatch};
use crate::shared::DomainResult;

/// What an upsert on the natural key did
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Created(Rate),
    /// A row with the same natural key existed; only its price was replaced.
    Updated(Rate),
}

impl UpsertOutcome {
    pub fn rate(&self) -> &Rate {
        match self {
            UpsertOutcome::Created(r) | UpsertOutcome::Updated(r) => r,
        }
    }

    pub fn into_rate(self) -> Rate {
        match self {
            UpsertOutcome::Created(r) | UpsertOutcome::Updated(r) => r,
        }
    }
}

#[async_trait]
pub trait RateRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Rate>>;

    /// Insert, or update the price of the row sharing the natural key
    /// `(rate_type, date, state_id, mandi_id, country, quality, size_mm, packing)`.
    /// Runs in one transaction; returns after commit.
    async fn upsert(&self, rate: NewRate) -> DomainResult<UpsertOutcome>;

    /// Apply a partial update. `NotFound` when the row is absent.
    async fn update(&self, id: i32, patch: &RatePatch) -> DomainResult<Rate>;

    /// `NotFound` when the row is absent.
    async fn delete(&self, id: i32) -> DomainResult<()>;

    /// Newest first (date, then id), joined with location names.
    async fn list(
        &self,
        filter: &RateFilter,
        offset: u64,
        limit: u64,
    ) -> DomainResult<Vec<RateListing>>;

    async fn count(&self, filter: &RateFilter) -> DomainResult<u64>;

    /// Per-day average and row count, ascending by date.
    async fn daily_averages(&self, filter: &RateFilter) -> DomainResult<Vec<DailyAverage>>;

    /// Rows projected for chart bucketing, ascending by date.
    async fn price_points(&self, filter: &RateFilter) -> DomainResult<Vec<PricePoint>>;

    /// `updated_at` of the most recently modified row.
    async fn last_updated(&self) -> DomainResult<Option<DateTime<Utc>>>;
}
