//! Rate change events
//!
//! Events carry only the row id. Subscribers are expected to re-read the
//! current state instead of applying the event as a delta.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RatePayload {
    pub id: i32,
}

/// A rate row was created, updated or deleted.
///
/// Wire form: `{"type":"rate:created","payload":{"id":42}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload")]
pub enum RateEvent {
    #[serde(rename = "rate:created")]
    Created(RatePayload),
    #[serde(rename = "rate:updated")]
    Updated(RatePayload),
    #[serde(rename = "rate:deleted")]
    Deleted(RatePayload),
}

impl RateEvent {
    pub fn created(id: i32) -> Self {
        RateEvent::Created(RatePayload { id })
    }

    pub fn updated(id: i32) -> Self {
        RateEvent::Updated(RatePayload { id })
    }

    pub fn deleted(id: i32) -> Self {
        RateEvent::Deleted(RatePayload { id })
    }

    pub fn kind(&self) -> EventKind {
        match self {
            RateEvent::Created(_) => EventKind::Created,
            RateEvent::Updated(_) => EventKind::Updated,
            RateEvent::Deleted(_) => EventKind::Deleted,
        }
    }

    pub fn rate_id(&self) -> i32 {
        match self {
            RateEvent::Created(p) | RateEvent::Updated(p) | RateEvent::Deleted(p) => p.id,
        }
    }
}

/// Discriminant used as the subscription key on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Created, EventKind::Updated, EventKind::Deleted];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "rate:created",
            EventKind::Updated => "rate:updated",
            EventKind::Deleted => "rate:deleted",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_wire_form() {
        let json = serde_json::to_string(&RateEvent::created(42)).unwrap();
        assert_eq!(json, r#"{"type":"rate:created","payload":{"id":42}}"#);

        let json = serde_json::to_string(&RateEvent::deleted(7)).unwrap();
        assert_eq!(json, r#"{"type":"rate:deleted","payload":{"id":7}}"#);
    }

    #[test]
    fn kind_matches_wire_tag() {
        for event in [RateEvent::created(1), RateEvent::updated(1), RateEvent::deleted(1)] {
            let value = serde_json::to_value(event).unwrap();
            assert_eq!(value["type"], event.kind().as_str());
            assert_eq!(event.rate_id(), 1);
        }
    }

    #[test]
    fn parses_wire_form() {
        let event: RateEvent =
            serde_json::from_str(r#"{"type":"rate:updated","payload":{"id":9}}"#).unwrap();
        assert_eq!(event, RateEvent::updated(9));
    }
}
