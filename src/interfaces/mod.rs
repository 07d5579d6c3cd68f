//! Inbound adapters: the REST API and the server-sent event stream

pub mod http;
pub mod sse;

pub use http::{create_api_router, AdminAuth, AppState, StreamSettings};
