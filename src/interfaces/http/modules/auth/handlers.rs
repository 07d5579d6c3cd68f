//! Login, logout and session probe for the admin back-office

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use tracing::{info, warn};

use super::dto::{LoginRequest, LoginResponse, SessionStatus};
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::{AdminAuth, SESSION_COOKIE};

/// Seven days
const SESSION_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

fn session_cookie(value: &str, max_age: u64) -> String {
    format!("{SESSION_COOKIE}={value}; HttpOnly; Path=/; Max-Age={max_age}; SameSite=Lax")
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Missing username or password")
    )
)]
pub async fn login(
    State(auth): State<AdminAuth>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !auth.verify_credentials(&request.username, &request.password) {
        warn!(username = %request.username, "Failed admin login");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid credentials")),
        ));
    }

    info!(username = %request.username, "Admin logged in");
    let cookie = session_cookie(auth.token(), SESSION_MAX_AGE_SECS);
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(ApiResponse::success(LoginResponse {
            token: auth.token().to_string(),
            mode: "session".to_string(),
        })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "Authentication",
    responses((status = 200, description = "Session cookie cleared", body = ApiResponse<SessionStatus>))
)]
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, session_cookie("", 0))]),
        Json(ApiResponse::success(SessionStatus { authenticated: false })),
    )
}

#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Authentication",
    responses((status = 200, description = "Whether the caller holds a valid admin token", body = ApiResponse<SessionStatus>))
)]
pub async fn session(
    State(auth): State<AdminAuth>,
    headers: HeaderMap,
) -> Json<ApiResponse<SessionStatus>> {
    Json(ApiResponse::success(SessionStatus {
        authenticated: auth.is_authorized(&headers),
    }))
}
