//! Shared-secret admin authentication
//!
//! A single configured token guards `/api/admin/*`. It is accepted as
//! `Authorization: Bearer <token>`, `X-Admin-Token: <token>` or the
//! `session` cookie set by `POST /api/login`. Secrets are compared by
//! SHA-256 digest so the comparison length does not depend on the input.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::common::ApiResponse;

pub const SESSION_COOKIE: &str = "session";
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

struct Secrets {
    username: String,
    password: [u8; 32],
    token: String,
    token_digest: [u8; 32],
}

#[derive(Clone)]
pub struct AdminAuth {
    secrets: Arc<Secrets>,
    disabled: bool,
}

impl AdminAuth {
    /// An empty `token` is replaced by a random one that lives until restart.
    pub fn new(username: &str, password: &str, token: &str, disabled: bool) -> Self {
        let token = if token.trim().is_empty() {
            warn!("No admin token configured, generated an ephemeral one");
            uuid::Uuid::new_v4().simple().to_string()
        } else {
            token.to_string()
        };
        if disabled {
            warn!("Admin authentication is DISABLED");
        }
        Self {
            secrets: Arc::new(Secrets {
                username: username.to_string(),
                password: digest(password),
                token_digest: digest(&token),
                token,
            }),
            disabled,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn token(&self) -> &str {
        &self.secrets.token
    }

    pub fn verify_token(&self, candidate: &str) -> bool {
        !candidate.is_empty() && digest(candidate) == self.secrets.token_digest
    }

    /// Empty configured usernames never match.
    pub fn verify_credentials(&self, username: &str, password: &str) -> bool {
        !self.secrets.username.is_empty()
            && username == self.secrets.username
            && digest(password) == self.secrets.password
    }

    /// Whether the request carries the admin token in any accepted place.
    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        self.disabled || request_token(headers).is_some_and(|t| self.verify_token(&t))
    }
}

/// Token from the Authorization header, `X-Admin-Token` or the session cookie,
/// in that order.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    if let Some(token) = headers.get(ADMIN_TOKEN_HEADER).and_then(|h| h.to_str().ok()) {
        return Some(token.trim().to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

pub async fn admin_auth_middleware(
    State(auth): State<AdminAuth>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if auth.is_authorized(request.headers()) {
        return next.run(request).await;
    }

    debug!(path = %request.uri().path(), "Rejected admin request");
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error("Unauthorized")),
    )
        .into_response()
}
