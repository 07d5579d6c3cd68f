pub mod aggregation;
pub mod model;
pub mod repository;

pub use aggregation::{build_multi_series, round2, ChartSeries, MultiSeries, RateCard, SizeBucket};
pub use model::{
    DailyAverage, NamedRef, NewRate, Packing, PricePoint, Quality, Rate, RateDraft, RateFilter,
    RateListing, RatePatch, RateType,
};
pub use repository::{RateRepository, UpsertOutcome};
