pub mod analytics;
pub mod announcements;
pub mod auth;
pub mod contact;
pub mod health;
pub mod market_updates;
pub mod media;
pub mod meta;
pub mod metrics;
pub mod rates;
pub mod request_id;
pub mod settings;
