//! SeaORM implementation of RateRepository

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::domain::rate::{
    DailyAverage, NamedRef, NewRate, Packing, PricePoint, Quality, Rate, RateFilter, RateListing,
    RatePatch, RateRepository, RateType, UpsertOutcome,
};
use crate::infrastructure::database::entities::{mandi, rate, state};
use crate::shared::{DomainError, DomainResult};

// ── Conversion helpers ──────────────────────────────────────────

impl From<RateType> for rate::RateType {
    fn from(t: RateType) -> Self {
        match t {
            RateType::Domestic => rate::RateType::Domestic,
            RateType::Export => rate::RateType::Export,
        }
    }
}

impl From<rate::RateType> for RateType {
    fn from(t: rate::RateType) -> Self {
        match t {
            rate::RateType::Domestic => RateType::Domestic,
            rate::RateType::Export => RateType::Export,
        }
    }
}

impl From<Quality> for rate::Quality {
    fn from(q: Quality) -> Self {
        match q {
            Quality::Low => rate::Quality::Low,
            Quality::Medium => rate::Quality::Medium,
            Quality::High => rate::Quality::High,
        }
    }
}

impl From<rate::Quality> for Quality {
    fn from(q: rate::Quality) -> Self {
        match q {
            rate::Quality::Low => Quality::Low,
            rate::Quality::Medium => Quality::Medium,
            rate::Quality::High => Quality::High,
        }
    }
}

impl From<Packing> for rate::Packing {
    fn from(p: Packing) -> Self {
        match p {
            Packing::Loose => rate::Packing::Loose,
            Packing::Bag => rate::Packing::Bag,
            Packing::Box => rate::Packing::Box,
        }
    }
}

impl From<rate::Packing> for Packing {
    fn from(p: rate::Packing) -> Self {
        match p {
            rate::Packing::Loose => Packing::Loose,
            rate::Packing::Bag => Packing::Bag,
            rate::Packing::Box => Packing::Box,
        }
    }
}

fn entity_to_domain(m: rate::Model) -> Rate {
    Rate {
        id: m.id,
        rate_type: m.rate_type.into(),
        date: m.date,
        state_id: m.state_id,
        mandi_id: m.mandi_id,
        country: m.country,
        quality: m.quality.into(),
        size_mm: m.size_mm,
        packing: m.packing.into(),
        packing_description: m.packing_description,
        price_per_kg: m.price_per_kg,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

/// Nullable parts of the key match `IS NULL` when unset.
fn nullable_eq<C, V>(column: C, value: Option<V>) -> sea_orm::sea_query::SimpleExpr
where
    C: ColumnTrait,
    V: Into<sea_orm::Value>,
{
    match value {
        Some(v) => column.eq(v),
        None => column.is_null(),
    }
}

fn natural_key(r: &NewRate) -> Condition {
    Condition::all()
        .add(rate::Column::RateType.eq(rate::RateType::from(r.rate_type)))
        .add(rate::Column::Date.eq(r.date))
        .add(nullable_eq(rate::Column::StateId, r.state_id))
        .add(nullable_eq(rate::Column::MandiId, r.mandi_id))
        .add(nullable_eq(rate::Column::Country, r.country.clone()))
        .add(rate::Column::Quality.eq(rate::Quality::from(r.quality)))
        .add(rate::Column::SizeMm.eq(r.size_mm))
        .add(rate::Column::Packing.eq(rate::Packing::from(r.packing)))
}

fn filter_condition(f: &RateFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(t) = f.rate_type {
        cond = cond.add(rate::Column::RateType.eq(rate::RateType::from(t)));
    }
    if let Some(country) = &f.country {
        cond = cond.add(rate::Column::Country.eq(country.as_str()));
    }
    if let Some(id) = f.state_id {
        cond = cond.add(rate::Column::StateId.eq(id));
    }
    if let Some(id) = f.mandi_id {
        cond = cond.add(rate::Column::MandiId.eq(id));
    }
    if let Some(q) = f.quality {
        cond = cond.add(rate::Column::Quality.eq(rate::Quality::from(q)));
    }
    if let Some(p) = f.packing {
        cond = cond.add(rate::Column::Packing.eq(rate::Packing::from(p)));
    }
    if let Some(min) = f.size_min {
        cond = cond.add(rate::Column::SizeMm.gte(min));
    }
    if let Some(max) = f.size_max {
        cond = cond.add(rate::Column::SizeMm.lte(max));
    }
    if let Some(from) = f.date_from {
        cond = cond.add(rate::Column::Date.gte(from));
    }
    if let Some(to) = f.date_to {
        cond = cond.add(rate::Column::Date.lte(to));
    }
    cond
}

#[derive(Debug, FromQueryResult)]
struct DailyRow {
    date: NaiveDate,
    avg_price: Option<f64>,
    row_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct PointRow {
    date: NaiveDate,
    size_mm: i32,
    quality: rate::Quality,
    price_per_kg: f64,
}

// ── SeaOrmRateRepository ────────────────────────────────────────

pub struct SeaOrmRateRepository {
    db: DatabaseConnection,
}

impl SeaOrmRateRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Load state and mandi names for a page of rows in two queries.
    async fn with_names(&self, models: Vec<rate::Model>) -> DomainResult<Vec<RateListing>> {
        let state_ids: HashSet<i32> = models.iter().filter_map(|m| m.state_id).collect();
        let mandi_ids: HashSet<i32> = models.iter().filter_map(|m| m.mandi_id).collect();

        let states: HashMap<i32, String> = if state_ids.is_empty() {
            HashMap::new()
        } else {
            state::Entity::find()
                .filter(state::Column::Id.is_in(state_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect()
        };
        let mandis: HashMap<i32, String> = if mandi_ids.is_empty() {
            HashMap::new()
        } else {
            mandi::Entity::find()
                .filter(mandi::Column::Id.is_in(mandi_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|m| (m.id, m.name))
                .collect()
        };

        let named = |id: Option<i32>, names: &HashMap<i32, String>| {
            id.and_then(|id| names.get(&id).map(|name| NamedRef { id, name: name.clone() }))
        };

        Ok(models
            .into_iter()
            .map(|m| {
                let state = named(m.state_id, &states);
                let mandi = named(m.mandi_id, &mandis);
                RateListing { rate: entity_to_domain(m), state, mandi }
            })
            .collect())
    }
}

#[async_trait]
impl RateRepository for SeaOrmRateRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Rate>> {
        let model = rate::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(entity_to_domain))
    }

    async fn upsert(&self, new: NewRate) -> DomainResult<UpsertOutcome> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let existing = rate::Entity::find()
            .filter(natural_key(&new))
            .one(&txn)
            .await?;

        let outcome = match existing {
            Some(model) => {
                let mut active: rate::ActiveModel = model.into();
                active.price_per_kg = Set(new.price_per_kg);
                active.updated_at = Set(now);
                UpsertOutcome::Updated(entity_to_domain(active.update(&txn).await?))
            }
            None => {
                let active = rate::ActiveModel {
                    rate_type: Set(new.rate_type.into()),
                    date: Set(new.date),
                    state_id: Set(new.state_id),
                    mandi_id: Set(new.mandi_id),
                    country: Set(new.country),
                    quality: Set(new.quality.into()),
                    size_mm: Set(new.size_mm),
                    packing: Set(new.packing.into()),
                    packing_description: Set(new.packing_description),
                    price_per_kg: Set(new.price_per_kg),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                UpsertOutcome::Created(entity_to_domain(active.insert(&txn).await?))
            }
        };

        txn.commit().await?;
        info!(
            rate_id = outcome.rate().id,
            created = matches!(outcome, UpsertOutcome::Created(_)),
            "Rate saved"
        );
        Ok(outcome)
    }

    async fn update(&self, id: i32, patch: &RatePatch) -> DomainResult<Rate> {
        let txn = self.db.begin().await?;

        let Some(model) = rate::Entity::find_by_id(id).one(&txn).await? else {
            return Err(DomainError::not_found("Rate", id));
        };

        let mut updated = entity_to_domain(model.clone());
        patch.apply(&mut updated)?;

        let mut active: rate::ActiveModel = model.into();
        active.rate_type = Set(updated.rate_type.into());
        active.date = Set(updated.date);
        active.state_id = Set(updated.state_id);
        active.mandi_id = Set(updated.mandi_id);
        active.country = Set(updated.country);
        active.quality = Set(updated.quality.into());
        active.size_mm = Set(updated.size_mm);
        active.packing = Set(updated.packing.into());
        active.packing_description = Set(updated.packing_description);
        active.price_per_kg = Set(updated.price_per_kg);
        active.updated_at = Set(Utc::now());

        let saved = active.update(&txn).await?;
        txn.commit().await?;
        Ok(entity_to_domain(saved))
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = rate::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Rate", id));
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: &RateFilter,
        offset: u64,
        limit: u64,
    ) -> DomainResult<Vec<RateListing>> {
        let models = rate::Entity::find()
            .filter(filter_condition(filter))
            .order_by_desc(rate::Column::Date)
            .order_by_desc(rate::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        self.with_names(models).await
    }

    async fn count(&self, filter: &RateFilter) -> DomainResult<u64> {
        Ok(rate::Entity::find()
            .filter(filter_condition(filter))
            .count(&self.db)
            .await?)
    }

    async fn daily_averages(&self, filter: &RateFilter) -> DomainResult<Vec<DailyAverage>> {
        let rows = rate::Entity::find()
            .select_only()
            .column(rate::Column::Date)
            .column_as(Expr::expr(Func::avg(Expr::col(rate::Column::PricePerKg))), "avg_price")
            .column_as(Expr::expr(Func::count(Expr::col(rate::Column::Id))), "row_count")
            .filter(filter_condition(filter))
            .group_by(rate::Column::Date)
            .order_by_asc(rate::Column::Date)
            .into_model::<DailyRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| DailyAverage {
                date: r.date,
                avg_price: r.avg_price.unwrap_or(0.0),
                count: r.row_count,
            })
            .collect())
    }

    async fn price_points(&self, filter: &RateFilter) -> DomainResult<Vec<PricePoint>> {
        let rows = rate::Entity::find()
            .select_only()
            .columns([
                rate::Column::Date,
                rate::Column::SizeMm,
                rate::Column::Quality,
                rate::Column::PricePerKg,
            ])
            .filter(filter_condition(filter))
            .order_by_asc(rate::Column::Date)
            .into_model::<PointRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| PricePoint {
                date: r.date,
                size_mm: r.size_mm,
                quality: r.quality.into(),
                price_per_kg: r.price_per_kg,
            })
            .collect())
    }

    async fn last_updated(&self) -> DomainResult<Option<DateTime<Utc>>> {
        let latest = rate::Entity::find()
            .order_by_desc(rate::Column::UpdatedAt)
            .one(&self.db)
            .await?;
        Ok(latest.map(|m| m.updated_at))
    }
}
