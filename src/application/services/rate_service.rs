//! Rate mutations and listings
//!
//! Every successful write publishes exactly one event, after the repository
//! call has committed. Failed writes publish nothing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::application::events::SharedEventBus;
use crate::domain::events::RateEvent;
use crate::domain::rate::{
    Rate, RateCard, RateDraft, RateFilter, RateListing, RatePatch, UpsertOutcome,
};
use crate::domain::repositories::RepositoryProvider;
use crate::shared::{DomainError, DomainResult};

/// Rows shown on the public price board
pub const PUBLIC_BOARD_SIZE: u64 = 50;
/// Pages past this are clamped, which keeps `offset` far from overflow.
pub const MAX_PAGE: u64 = 1_000_000;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct RatePage {
    pub items: Vec<RateListing>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    /// Newest `updated_at` among `items`
    pub last_updated: Option<DateTime<Utc>>,
    /// `total` was estimated because the count query failed
    pub approximate: bool,
}

pub struct RateService {
    repos: Arc<dyn RepositoryProvider>,
    event_bus: SharedEventBus,
}

impl RateService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, event_bus: SharedEventBus) -> Self {
        Self { repos, event_bus }
    }

    /// Insert a rate, or replace the price of the row with the same natural key.
    pub async fn create(&self, draft: RateDraft) -> DomainResult<UpsertOutcome> {
        let new = draft.into_new_rate()?;
        self.check_location(new.state_id, new.mandi_id).await?;

        let outcome = self.repos.rates().upsert(new).await?;
        let event = match &outcome {
            UpsertOutcome::Created(rate) => RateEvent::created(rate.id),
            UpsertOutcome::Updated(rate) => RateEvent::updated(rate.id),
        };
        self.event_bus.publish(event);
        Ok(outcome)
    }

    pub async fn update(&self, id: i32, patch: RatePatch) -> DomainResult<Rate> {
        let Some(mut preview) = self.repos.rates().find_by_id(id).await? else {
            return Err(DomainError::not_found("Rate", id));
        };
        patch.apply(&mut preview)?;
        if patch.state_id.is_some() || patch.mandi_id.is_some() {
            self.check_location(preview.state_id, preview.mandi_id).await?;
        }

        let rate = self.repos.rates().update(id, &patch).await?;
        self.event_bus.publish(RateEvent::updated(rate.id));
        info!(rate_id = rate.id, "Rate updated");
        Ok(rate)
    }

    pub async fn delete(&self, id: i32) -> DomainResult<()> {
        self.repos.rates().delete(id).await?;
        self.event_bus.publish(RateEvent::deleted(id));
        info!(rate_id = id, "Rate deleted");
        Ok(())
    }

    /// One page of rows, newest first. A failing count query degrades to an
    /// estimated total instead of failing the page.
    pub async fn list(&self, filter: &RateFilter, page: u64, page_size: u64) -> DomainResult<RatePage> {
        let page = page.clamp(1, MAX_PAGE);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * page_size;

        let items = self.repos.rates().list(filter, offset, page_size).await?;
        let last_updated = items.iter().map(|r| r.rate.updated_at).max();

        let (total, total_pages, approximate) = match self.repos.rates().count(filter).await {
            Ok(total) => (total, total.div_ceil(page_size).max(1), false),
            Err(e) => {
                warn!(error = %e, "Rate count failed, estimating totals");
                let total = offset.saturating_add(items.len() as u64);
                let total_pages = if items.len() as u64 == page_size {
                    page.saturating_add(1)
                } else {
                    total.div_ceil(page_size).max(1)
                };
                (total, total_pages, true)
            }
        };

        Ok(RatePage { items, total, page, page_size, total_pages, last_updated, approximate })
    }

    pub async fn public_board(&self) -> DomainResult<Vec<RateCard>> {
        let rows = self
            .repos
            .rates()
            .list(&RateFilter::default(), 0, PUBLIC_BOARD_SIZE)
            .await?;
        Ok(rows.iter().map(RateCard::from_listing).collect())
    }

    /// DOMESTIC rows must point at an existing mandi inside the given state.
    async fn check_location(&self, state_id: Option<i32>, mandi_id: Option<i32>) -> DomainResult<()> {
        let locations = self.repos.locations();
        if let Some(state_id) = state_id {
            if locations.find_state(state_id).await?.is_none() {
                return Err(DomainError::validation(format!("state {state_id} does not exist")));
            }
        }
        if let Some(mandi_id) = mandi_id {
            let Some(mandi) = locations.find_mandi(mandi_id).await? else {
                return Err(DomainError::validation(format!("mandi {mandi_id} does not exist")));
            };
            match state_id {
                Some(state_id) if state_id != mandi.state_id => {
                    return Err(DomainError::validation(format!(
                        "mandi {mandi_id} does not belong to state {state_id}"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::create_event_bus;
    use crate::domain::rate::{Packing, Quality, RateType};
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use crate::infrastructure::database::testing::test_db;
    use chrono::NaiveDate;

    fn draft(price: f64) -> RateDraft {
        RateDraft {
            rate_type: RateType::Domestic,
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            state_id: Some(1),
            mandi_id: Some(1),
            country: None,
            quality: Some(Quality::Medium),
            size_mm: 45,
            packing: Packing::Bag,
            packing_description: None,
            price_per_kg: price,
        }
    }

    async fn service() -> (RateService, SharedEventBus) {
        let repos = Arc::new(SeaOrmRepositoryProvider::new(test_db().await));
        let bus = create_event_bus();
        (RateService::new(repos, bus.clone()), bus)
    }

    #[tokio::test]
    async fn create_then_upsert_publish_created_then_updated() {
        let (service, bus) = service().await;
        let mut events = bus.subscribe_channel(8);

        let first = service.create(draft(20.0)).await.unwrap();
        let second = service.create(draft(21.0)).await.unwrap();
        let id = first.rate().id;
        assert_eq!(second.rate().id, id);

        assert_eq!(events.try_recv(), Some(RateEvent::created(id)));
        assert_eq!(events.try_recv(), Some(RateEvent::updated(id)));
        assert_eq!(events.try_recv(), None);
    }

    #[tokio::test]
    async fn rejected_writes_publish_nothing() {
        let (service, bus) = service().await;
        let mut events = bus.subscribe_channel(8);

        let mut wrong_state = draft(20.0);
        wrong_state.state_id = Some(2);
        assert!(matches!(service.create(wrong_state).await, Err(DomainError::Validation(_))));

        let mut unknown_mandi = draft(20.0);
        unknown_mandi.mandi_id = Some(77);
        assert!(service.create(unknown_mandi).await.is_err());

        assert!(matches!(
            service.update(404, RatePatch::default()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(service.delete(404).await, Err(DomainError::NotFound { .. })));

        assert_eq!(events.try_recv(), None);
    }

    #[tokio::test]
    async fn update_and_delete_publish_once_each() {
        let (service, bus) = service().await;
        let id = service.create(draft(20.0)).await.unwrap().rate().id;
        let mut events = bus.subscribe_channel(8);

        let patch = RatePatch { price_per_kg: Some(26.0), ..Default::default() };
        let rate = service.update(id, patch).await.unwrap();
        assert_eq!(rate.price_per_kg, 26.0);
        service.delete(id).await.unwrap();

        assert_eq!(events.try_recv(), Some(RateEvent::updated(id)));
        assert_eq!(events.try_recv(), Some(RateEvent::deleted(id)));
        assert_eq!(events.try_recv(), None);
    }

    #[tokio::test]
    async fn update_checks_relocated_mandi() {
        let (service, _bus) = service().await;
        let id = service.create(draft(20.0)).await.unwrap().rate().id;

        let patch = RatePatch { mandi_id: Some(Some(2)), ..Default::default() };
        assert!(matches!(service.update(id, patch).await, Err(DomainError::Validation(_))));

        let patch = RatePatch {
            state_id: Some(Some(2)),
            mandi_id: Some(Some(2)),
            ..Default::default()
        };
        let moved = service.update(id, patch).await.unwrap();
        assert_eq!(moved.state_id, Some(2));
    }

    #[tokio::test]
    async fn list_paginates_with_totals() {
        let (service, _bus) = service().await;
        for size in [30, 40, 50] {
            let mut d = draft(20.0);
            d.size_mm = size;
            service.create(d).await.unwrap();
        }

        let page = service.list(&RateFilter::default(), 2, 2).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert!(!page.approximate);
        assert_eq!(page.last_updated, Some(page.items[0].rate.updated_at));

        let empty = service.list(&RateFilter::default(), 9, 20).await.unwrap();
        assert!(empty.items.is_empty());
        assert_eq!(empty.total_pages, 1);
        assert_eq!(empty.last_updated, None);
    }

    #[tokio::test]
    async fn public_board_labels_cards() {
        let (service, _bus) = service().await;
        service.create(draft(20.0)).await.unwrap();

        let cards = service.public_board().await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].location, "Lasalgaon, Maharashtra");
        assert_eq!(cards[0].quality, "Grade A");
    }

    #[tokio::test]
    async fn oversized_page_is_clamped_not_overflowed() {
        let (service, _bus) = service().await;
        service.create(draft(20.0)).await.unwrap();

        let page = service.list(&RateFilter::default(), u64::MAX, u64::MAX).await.unwrap();
        assert_eq!(page.page, MAX_PAGE);
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn export_patch_keeps_natural_key_consistent() {
        let (service, bus) = service().await;
        let id = service.create(draft(20.0)).await.unwrap().rate().id;

        let patch = RatePatch {
            rate_type: Some(RateType::Export),
            country: Some(Some("UAE".into())),
            ..Default::default()
        };
        let exported = service.update(id, patch).await.unwrap();
        assert_eq!((exported.state_id, exported.mandi_id), (None, None));
        assert_eq!(exported.country.as_deref(), Some("UAE"));

        let mut events = bus.subscribe_channel(8);
        let same_key = RateDraft {
            rate_type: RateType::Export,
            state_id: None,
            mandi_id: None,
            country: Some("UAE".into()),
            price_per_kg: 33.0,
            ..draft(0.0)
        };
        let outcome = service.create(same_key).await.unwrap();
        assert!(matches!(outcome, UpsertOutcome::Updated(_)));
        assert_eq!(outcome.rate().id, id);
        assert_eq!(events.try_recv(), Some(RateEvent::updated(id)));
    }
}
