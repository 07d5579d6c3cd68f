//! Unified access to the per-aggregate repositories
//!
//! ```ignore
//! async fn handle(repos: &dyn RepositoryProvider) {
//!     let rate = repos.rates().find_by_id(42).await?;
//!     let states = repos.locations().list_states().await?;
//! }
//! ```

use super::location::LocationRepository;
use super::rate::RateRepository;

pub trait RepositoryProvider: Send + Sync {
    fn rates(&self) -> &dyn RateRepository;
    fn locations(&self) -> &dyn LocationRepository;
}
