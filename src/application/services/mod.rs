pub mod chart_service;
pub mod lookup_service;
pub mod rate_service;

pub use chart_service::{BucketedSeries, ChartService, DailySeries, WeeklySummary};
pub use lookup_service::{Lookup, LookupService, LookupSource};
pub use rate_service::{RatePage, RateService, MAX_PAGE, PUBLIC_BOARD_SIZE};
