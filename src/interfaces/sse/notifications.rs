//! Rate change notifications for browser clients
//!
//! Each connection gets its own bounded bus subscription. The first frame is
//! a `connected` handshake; clients treat it, like every later frame, as a
//! signal to re-fetch their rate list. A `: hb` comment keeps idle
//! connections open through proxies. The stream ends when the client goes
//! away or the server begins shutting down, and the subscription is dropped
//! with it.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use chrono::Utc;
use futures_util::stream::{self, Stream, StreamExt};
use tracing::{info, warn};

use crate::application::events::{EventSubscriber, SharedEventBus};
use crate::shared::ShutdownSignal;

pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct NotificationState {
    pub event_bus: SharedEventBus,
    pub keepalive: Duration,
    /// Per-connection queue length
    pub buffer: usize,
    pub shutdown: ShutdownSignal,
}

pub fn create_notification_state(
    event_bus: SharedEventBus,
    keepalive: Duration,
    buffer: usize,
    shutdown: ShutdownSignal,
) -> NotificationState {
    NotificationState { event_bus, keepalive, buffer, shutdown }
}

fn handshake() -> Event {
    let body = serde_json::json!({
        "type": "connected",
        "ts": Utc::now().timestamp_millis(),
    });
    Event::default().data(body.to_string())
}

fn rate_events(subscriber: EventSubscriber) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(subscriber, |mut subscriber| async move {
        let event = subscriber.recv().await?;
        Some((event, subscriber))
    })
    .filter_map(|event| async move {
        match Event::default().json_data(event) {
            Ok(frame) => Some(Ok(frame)),
            Err(e) => {
                warn!(error = %e, "Failed to encode rate event");
                None
            }
        }
    })
}

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    responses(
        (status = 200, description = "Stream of {type, payload: {id}} frames", body = String, content_type = "text/event-stream")
    )
)]
pub async fn sse_events_handler(State(state): State<NotificationState>) -> impl IntoResponse {
    // Subscribe before the handshake is written so nothing published in
    // between is missed.
    let subscriber = state.event_bus.subscribe_channel(state.buffer);
    info!(subscriber = subscriber.id(), "Event stream opened");

    let stream = stream::once(async { Ok::<_, Infallible>(handshake()) })
        .chain(rate_events(subscriber))
        .take_until(state.shutdown.notified().wait());

    let sse = Sse::new(stream).keep_alive(KeepAlive::new().interval(state.keepalive).text("hb"));

    (
        [
            (header::CACHE_CONTROL, "no-cache, no-transform"),
            (header::HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        sse,
    )
}
