//! # Onion Rates
//!
//! Daily onion market rates: a public read API, an admin back-office and a
//! live change stream so open pages refresh when a rate is written.
//!
//! ## Architecture
//!
//! - **shared**: error type, retry helper, serde helpers, shutdown signal
//! - **domain**: rates, locations, change events and repository traits
//! - **application**: rate, chart and lookup services plus the event bus
//! - **infrastructure**: SeaORM entities, migrations and repositories
//! - **interfaces**: REST API with Swagger docs, and the SSE stream at `/api/events`

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig};

pub use interfaces::create_api_router;

pub use application::{create_event_bus, EventBus, SharedEventBus};
pub use domain::RateEvent;
