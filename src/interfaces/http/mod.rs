//! HTTP REST API
//!
//! - `common`: response envelope, error mapping, validated JSON extractor
//! - `middleware`: shared-secret admin authentication
//! - `modules`: handlers and DTOs per resource
//! - `router`: route table, application state and OpenAPI document

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use middleware::AdminAuth;
pub use router::{create_api_router, ApiDoc, AppState, StreamSettings};
