//! Server-sent event stream of rate changes (`GET /api/events`)

pub mod notifications;

pub use notifications::{create_notification_state, sse_events_handler, NotificationState};
