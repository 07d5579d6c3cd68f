//! Application events (pub/sub)
//!
//! Event types are defined in `domain::events`; the bus lives here.

pub mod event_bus;

pub use crate::domain::events::{EventKind, RateEvent, RatePayload};
pub use event_bus::{
    create_event_bus, EventBus, EventSubscriber, ListenerId, SharedEventBus,
    DEFAULT_SUBSCRIBER_BUFFER,
};
