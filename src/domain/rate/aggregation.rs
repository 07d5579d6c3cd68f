//! Pure aggregations over rate rows used by the chart and card endpoints

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

use super::model::{PricePoint, Quality, RateListing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    pub fn for_size(size_mm: i32) -> Self {
        match size_mm {
            ..=35 => SizeBucket::Small,
            36..=55 => SizeBucket::Medium,
            _ => SizeBucket::Large,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeBucket::Small => "SMALL",
            SizeBucket::Medium => "MEDIUM",
            SizeBucket::Large => "LARGE",
        }
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartSeries {
    /// `<SIZE BUCKET>-<QUALITY>`, e.g. `MEDIUM-HIGH`
    pub key: String,
    pub name: String,
    /// One value per label; `null` where the series has no rows that day
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiSeries {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Group rows by day and by (size bucket, quality).
///
/// Labels are the sorted distinct days; series keys are sorted; every series
/// has exactly one value per label.
pub fn build_multi_series(points: &[PricePoint]) -> MultiSeries {
    let mut days: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut sums: BTreeMap<String, BTreeMap<NaiveDate, (f64, u32)>> = BTreeMap::new();

    for point in points {
        days.insert(point.date);
        let key = series_key(SizeBucket::for_size(point.size_mm), point.quality);
        let slot = sums.entry(key).or_default().entry(point.date).or_insert((0.0, 0));
        slot.0 += point.price_per_kg;
        slot.1 += 1;
    }

    let series = sums
        .into_iter()
        .map(|(key, by_day)| ChartSeries {
            name: key.replacen('-', " / ", 1),
            values: days
                .iter()
                .map(|day| by_day.get(day).map(|(sum, n)| round2(sum / f64::from(*n))))
                .collect(),
            key,
        })
        .collect();

    MultiSeries {
        labels: days.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
        series,
    }
}

fn series_key(bucket: SizeBucket, quality: Quality) -> String {
    format!("{}-{}", bucket.as_str(), quality.as_str())
}

/// Display card for the public price board
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateCard {
    pub id: String,
    pub date: String,
    pub variety: String,
    pub location: String,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub quality: String,
    pub unit: String,
    pub packing: String,
    pub packing_description: Option<String>,
    pub rate_type: String,
    pub country: Option<String>,
    pub size_mm: Option<i32>,
}

impl RateCard {
    /// Band the stored price into a min/max range for display.
    pub fn from_listing(listing: &RateListing) -> Self {
        let rate = &listing.rate;
        let avg = rate.price_per_kg;
        let mandi = listing.mandi.as_ref().map_or("Unknown", |m| m.name.as_str());
        let state = listing.state.as_ref().map_or("India", |s| s.name.as_str());

        Self {
            id: rate.id.to_string(),
            date: rate
                .date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
                .unwrap_or_default(),
            variety: "Red Onion".to_string(),
            location: format!("{mandi}, {state}"),
            min_price: (avg - 200.0).floor().max(0.0),
            max_price: (avg + 300.0).ceil().max(avg),
            avg_price: avg,
            quality: rate.quality.display_label().to_string(),
            unit: "per kg".to_string(),
            packing: enum_label(&rate.packing),
            packing_description: rate.packing_description.clone(),
            rate_type: enum_label(&rate.rate_type),
            country: rate.country.clone(),
            size_mm: Some(rate.size_mm),
        }
    }

    /// Placeholder board shown when the database cannot be reached.
    pub fn fallback() -> Vec<Self> {
        vec![Self {
            id: "fallback-1".to_string(),
            date: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            variety: "Red Onion".to_string(),
            location: "Nashik, Maharashtra".to_string(),
            min_price: 2500.0,
            max_price: 3200.0,
            avg_price: 2850.0,
            quality: "Premium".to_string(),
            unit: "per quintal".to_string(),
            packing: "BAG".to_string(),
            packing_description: Some("25 KG Jute Bag".to_string()),
            rate_type: "DOMESTIC".to_string(),
            country: None,
            size_mm: Some(55),
        }]
    }
}

fn enum_label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}
