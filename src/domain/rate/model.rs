//! Rate row model and the validated inputs that produce it

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateType {
    Domestic,
    Export,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Quality {
    Low,
    Medium,
    High,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Low => "LOW",
            Quality::Medium => "MEDIUM",
            Quality::High => "HIGH",
        }
    }

    /// Label shown on public rate cards
    pub fn display_label(&self) -> &'static str {
        match self {
            Quality::High => "Premium",
            Quality::Medium => "Grade A",
            Quality::Low => "Standard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Packing {
    Loose,
    Bag,
    Box,
}

impl FromStr for RateType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DOMESTIC" => Ok(RateType::Domestic),
            "EXPORT" => Ok(RateType::Export),
            other => Err(DomainError::validation(format!("unknown rate type {other}"))),
        }
    }
}

impl FromStr for Quality {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Quality::Low),
            "MEDIUM" => Ok(Quality::Medium),
            "HIGH" => Ok(Quality::High),
            other => Err(DomainError::validation(format!("unknown quality {other}"))),
        }
    }
}

impl FromStr for Packing {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOOSE" => Ok(Packing::Loose),
            "BAG" => Ok(Packing::Bag),
            "BOX" => Ok(Packing::Box),
            other => Err(DomainError::validation(format!("unknown packing {other}"))),
        }
    }
}

/// One persisted price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub id: i32,
    pub rate_type: RateType,
    pub date: NaiveDate,
    pub state_id: Option<i32>,
    pub mandi_id: Option<i32>,
    pub country: Option<String>,
    pub quality: Quality,
    pub size_mm: i32,
    pub packing: Packing,
    pub packing_description: Option<String>,
    pub price_per_kg: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A create request before per-type rules are applied.
///
/// DOMESTIC rows need a state, a mandi and a quality. EXPORT rows need a
/// country; their quality defaults to MEDIUM and location fields are dropped.
#[derive(Debug, Clone)]
pub struct RateDraft {
    pub rate_type: RateType,
    pub date: NaiveDate,
    pub state_id: Option<i32>,
    pub mandi_id: Option<i32>,
    pub country: Option<String>,
    pub quality: Option<Quality>,
    pub size_mm: i32,
    pub packing: Packing,
    pub packing_description: Option<String>,
    pub price_per_kg: f64,
}

impl RateDraft {
    pub fn into_new_rate(self) -> DomainResult<NewRate> {
        check_measures(self.size_mm, self.price_per_kg)?;
        let packing_description = non_blank(self.packing_description);

        match self.rate_type {
            RateType::Domestic => {
                let (Some(state_id), Some(mandi_id), Some(quality)) =
                    (self.state_id, self.mandi_id, self.quality)
                else {
                    return Err(DomainError::validation(
                        "stateId, mandiId and quality are required for DOMESTIC",
                    ));
                };
                Ok(NewRate {
                    rate_type: RateType::Domestic,
                    date: self.date,
                    state_id: Some(state_id),
                    mandi_id: Some(mandi_id),
                    country: None,
                    quality,
                    size_mm: self.size_mm,
                    packing: self.packing,
                    packing_description,
                    price_per_kg: self.price_per_kg,
                })
            }
            RateType::Export => {
                let country = non_blank(self.country)
                    .ok_or_else(|| DomainError::validation("country is required for EXPORT"))?;
                Ok(NewRate {
                    rate_type: RateType::Export,
                    date: self.date,
                    state_id: None,
                    mandi_id: None,
                    country: Some(country),
                    quality: self.quality.unwrap_or(Quality::Medium),
                    size_mm: self.size_mm,
                    packing: self.packing,
                    packing_description,
                    price_per_kg: self.price_per_kg,
                })
            }
        }
    }
}

/// A normalized row ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewRate {
    pub rate_type: RateType,
    pub date: NaiveDate,
    pub state_id: Option<i32>,
    pub mandi_id: Option<i32>,
    pub country: Option<String>,
    pub quality: Quality,
    pub size_mm: i32,
    pub packing: Packing,
    pub packing_description: Option<String>,
    pub price_per_kg: f64,
}

/// Partial update. Outer `None` leaves a field alone; for nullable columns
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct RatePatch {
    pub rate_type: Option<RateType>,
    pub date: Option<NaiveDate>,
    pub state_id: Option<Option<i32>>,
    pub mandi_id: Option<Option<i32>>,
    pub country: Option<Option<String>>,
    pub quality: Option<Quality>,
    pub size_mm: Option<i32>,
    pub packing: Option<Packing>,
    pub packing_description: Option<Option<String>>,
    pub price_per_kg: Option<f64>,
}

impl RatePatch {
    pub fn is_empty(&self) -> bool {
        self.rate_type.is_none()
            && self.date.is_none()
            && self.state_id.is_none()
            && self.mandi_id.is_none()
            && self.country.is_none()
            && self.quality.is_none()
            && self.size_mm.is_none()
            && self.packing.is_none()
            && self.packing_description.is_none()
            && self.price_per_kg.is_none()
    }

    /// Apply the patch to `rate` and check the result still describes a
    /// valid row of its type.
    pub fn apply(&self, rate: &mut Rate) -> DomainResult<()> {
        if let Some(v) = self.rate_type {
            rate.rate_type = v;
        }
        if let Some(v) = self.date {
            rate.date = v;
        }
        if let Some(v) = self.state_id {
            rate.state_id = v;
        }
        if let Some(v) = self.mandi_id {
            rate.mandi_id = v;
        }
        if let Some(v) = &self.country {
            rate.country = non_blank(v.clone());
        }
        if let Some(v) = self.quality {
            rate.quality = v;
        }
        if let Some(v) = self.size_mm {
            rate.size_mm = v;
        }
        if let Some(v) = self.packing {
            rate.packing = v;
        }
        if let Some(v) = &self.packing_description {
            rate.packing_description = non_blank(v.clone());
        }
        if let Some(v) = self.price_per_kg {
            rate.price_per_kg = v;
        }

        check_measures(rate.size_mm, rate.price_per_kg)?;
        // Same shape as `RateDraft::into_new_rate`, so the natural key of a
        // patched row matches rows created with the same values.
        match rate.rate_type {
            RateType::Domestic => {
                if rate.state_id.is_none() || rate.mandi_id.is_none() {
                    return Err(DomainError::validation(
                        "stateId and mandiId are required for DOMESTIC",
                    ));
                }
                rate.country = None;
            }
            RateType::Export => {
                if rate.country.is_none() {
                    return Err(DomainError::validation("country is required for EXPORT"));
                }
                rate.state_id = None;
                rate.mandi_id = None;
            }
        }
        Ok(())
    }
}

/// Query filters for rate listings. Every field is optional and ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateFilter {
    pub rate_type: Option<RateType>,
    pub country: Option<String>,
    pub state_id: Option<i32>,
    pub mandi_id: Option<i32>,
    pub quality: Option<Quality>,
    pub packing: Option<Packing>,
    pub size_min: Option<i32>,
    pub size_max: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NamedRef {
    pub id: i32,
    pub name: String,
}

/// A rate row joined with its location names
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RateListing {
    #[serde(flatten)]
    pub rate: Rate,
    pub state: Option<NamedRef>,
    pub mandi: Option<NamedRef>,
}

/// Average price of all rows on one day, computed in the database
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub avg_price: f64,
    pub count: i64,
}

/// Minimal projection used by in-memory chart aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub size_mm: i32,
    pub quality: Quality,
    pub price_per_kg: f64,
}

fn check_measures(size_mm: i32, price_per_kg: f64) -> DomainResult<()> {
    if size_mm <= 0 {
        return Err(DomainError::validation("sizeMm must be a positive integer"));
    }
    if !(price_per_kg.is_finite() && price_per_kg > 0.0) {
        return Err(DomainError::validation("pricePerKg must be positive"));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
