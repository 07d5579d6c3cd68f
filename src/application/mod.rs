//! Application layer: use cases over the domain, plus the event bus

pub mod events;
pub mod services;

pub use events::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use services::{ChartService, LookupService, RateService};
