//! Chart aggregations over rate rows

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::domain::rate::{build_multi_series, round2, DailyAverage, MultiSeries, RateFilter};
use crate::domain::repositories::RepositoryProvider;
use crate::shared::DomainResult;

/// Window used by the multi-series chart when no dates are given
pub const DEFAULT_MULTI_SERIES_DAYS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub points: Vec<DailyAverage>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketedSeries {
    pub chart: MultiSeries,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
    /// Average of today's rows, if any were entered
    pub today_avg: Option<f64>,
    /// Per-day averages over the last seven days, today included
    pub last7: Vec<(NaiveDate, f64)>,
    pub rates_total: u64,
}

pub struct ChartService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ChartService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn daily_series(&self, filter: &RateFilter) -> DomainResult<DailySeries> {
        let points = self.repos.rates().daily_averages(filter).await?;
        let last_updated = self.repos.rates().last_updated().await?;
        Ok(DailySeries { points, last_updated })
    }

    /// Series per (size bucket, quality). Without explicit bounds the window
    /// is the last `DEFAULT_MULTI_SERIES_DAYS` days up to `today`.
    pub async fn bucketed_series(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> DomainResult<BucketedSeries> {
        let date_from = match (date_from, date_to) {
            (None, None) => today.checked_sub_days(Days::new(DEFAULT_MULTI_SERIES_DAYS)),
            (from, _) => from,
        };
        let filter = RateFilter { date_from, date_to, ..Default::default() };

        let points = self.repos.rates().price_points(&filter).await?;
        let last_updated = self.repos.rates().last_updated().await?;
        Ok(BucketedSeries { chart: build_multi_series(&points), last_updated })
    }

    pub async fn weekly_summary(&self, today: NaiveDate) -> DomainResult<WeeklySummary> {
        let filter = RateFilter {
            date_from: today.checked_sub_days(Days::new(6)),
            ..Default::default()
        };
        let last7: Vec<(NaiveDate, f64)> = self
            .repos
            .rates()
            .daily_averages(&filter)
            .await?
            .into_iter()
            .map(|d| (d.date, round2(d.avg_price)))
            .collect();
        let today_avg = last7.iter().find(|(d, _)| *d == today).map(|(_, avg)| *avg);
        let rates_total = self.repos.rates().count(&RateFilter::default()).await?;

        Ok(WeeklySummary { today_avg, last7, rates_total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rate::{NewRate, Packing, Quality, RateType};
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use crate::infrastructure::database::testing::test_db;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn row(date: NaiveDate, size_mm: i32, quality: Quality, price: f64) -> NewRate {
        NewRate {
            rate_type: RateType::Domestic,
            date,
            state_id: Some(1),
            mandi_id: Some(1),
            country: None,
            quality,
            size_mm,
            packing: Packing::Bag,
            packing_description: None,
            price_per_kg: price,
        }
    }

    async fn seeded(rows: Vec<NewRate>) -> ChartService {
        let repos = Arc::new(SeaOrmRepositoryProvider::new(test_db().await));
        for r in rows {
            repos.rates().upsert(r).await.unwrap();
        }
        ChartService::new(repos)
    }

    #[tokio::test]
    async fn daily_series_filters_and_averages() {
        let service = seeded(vec![
            row(day(1), 40, Quality::High, 10.0),
            row(day(1), 50, Quality::High, 20.0),
            row(day(2), 50, Quality::Low, 30.0),
        ])
        .await;

        let all = service.daily_series(&RateFilter::default()).await.unwrap();
        assert_eq!(all.points.len(), 2);
        assert_eq!(all.points[0].avg_price, 15.0);
        assert!(all.last_updated.is_some());

        let high = RateFilter { quality: Some(Quality::High), ..Default::default() };
        let high = service.daily_series(&high).await.unwrap();
        assert_eq!(high.points.len(), 1);
        assert_eq!(high.points[0].count, 2);
    }

    #[tokio::test]
    async fn bucketed_series_defaults_to_sixty_day_window() {
        let today = day(31);
        let old = today.checked_sub_days(Days::new(61)).unwrap();
        let service = seeded(vec![
            row(old, 40, Quality::High, 99.0),
            row(day(30), 30, Quality::Low, 12.0),
            row(day(31), 60, Quality::High, 18.0),
        ])
        .await;

        let out = service.bucketed_series(None, None, today).await.unwrap();
        assert_eq!(out.chart.labels, vec!["2025-05-30", "2025-05-31"]);
        let keys: Vec<_> = out.chart.series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["LARGE-HIGH", "SMALL-LOW"]);

        let explicit = service.bucketed_series(Some(old), None, today).await.unwrap();
        assert_eq!(explicit.chart.labels.len(), 3);
    }

    #[tokio::test]
    async fn weekly_summary_covers_seven_days_inclusive() {
        let today = day(20);
        let service = seeded(vec![
            row(day(13), 40, Quality::High, 50.0),
            row(day(14), 40, Quality::High, 10.0),
            row(day(20), 40, Quality::High, 10.0),
            row(day(20), 50, Quality::High, 10.5),
        ])
        .await;

        let summary = service.weekly_summary(today).await.unwrap();
        assert_eq!(summary.last7, vec![(day(14), 10.0), (day(20), 10.25)]);
        assert_eq!(summary.today_avg, Some(10.25));
        assert_eq!(summary.rates_total, 4);
    }
}
