//! Domain events
//!
//! Facts about rate rows that changed. The bus that fans them out lives in
//! `application::events`.

pub mod types;

pub use types::{EventKind, RateEvent, RatePayload};
