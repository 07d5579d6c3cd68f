pub mod events;
pub mod location;
pub mod rate;
pub mod repositories;

pub use events::{EventKind, RateEvent};
pub use repositories::RepositoryProvider;
pub use crate::shared::{DomainError, DomainResult};
