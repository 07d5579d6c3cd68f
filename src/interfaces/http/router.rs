//! Route table, application state and Swagger UI

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::IdResponse;
use super::middleware::{admin_auth_middleware, AdminAuth};
use super::modules::{
    analytics, announcements, auth, contact, health, market_updates, media, meta, metrics, rates,
    request_id, settings,
};
use crate::application::services::{ChartService, LookupService, RateService};
use crate::application::SharedEventBus;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::rate::{Rate, RateCard, RateListing};
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::interfaces::sse::{self, create_notification_state, NotificationState};
use crate::shared::ShutdownSignal;

/// Event stream tuning
#[derive(Debug, Clone, Copy)]
pub struct StreamSettings {
    pub keepalive: Duration,
    pub subscriber_buffer: usize,
}

/// Everything handlers can reach. Each handler extracts only its own slice
/// through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub event_bus: SharedEventBus,
    pub rate_service: Arc<RateService>,
    pub chart_service: Arc<ChartService>,
    pub lookup_service: Arc<LookupService>,
    pub admin: AdminAuth,
    pub notifications: NotificationState,
    pub started_at: Arc<Instant>,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    pub fn new(
        db: DatabaseConnection,
        event_bus: SharedEventBus,
        admin: AdminAuth,
        stream: StreamSettings,
        shutdown: ShutdownSignal,
    ) -> Self {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        Self {
            rate_service: Arc::new(RateService::new(repos.clone(), event_bus.clone())),
            chart_service: Arc::new(ChartService::new(repos.clone())),
            lookup_service: Arc::new(LookupService::new(repos)),
            notifications: create_notification_state(
                event_bus.clone(),
                stream.keepalive,
                stream.subscriber_buffer,
                shutdown,
            ),
            db,
            event_bus,
            admin,
            started_at: Arc::new(Instant::now()),
        }
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(s: &AppState) -> Self {
        s.db.clone()
    }
}

impl FromRef<AppState> for AdminAuth {
    fn from_ref(s: &AppState) -> Self {
        s.admin.clone()
    }
}

impl FromRef<AppState> for NotificationState {
    fn from_ref(s: &AppState) -> Self {
        s.notifications.clone()
    }
}

impl FromRef<AppState> for rates::RatesState {
    fn from_ref(s: &AppState) -> Self {
        rates::RatesState {
            rate_service: s.rate_service.clone(),
            chart_service: s.chart_service.clone(),
        }
    }
}

impl FromRef<AppState> for meta::MetaState {
    fn from_ref(s: &AppState) -> Self {
        meta::MetaState { lookup_service: s.lookup_service.clone() }
    }
}

impl FromRef<AppState> for analytics::AnalyticsState {
    fn from_ref(s: &AppState) -> Self {
        analytics::AnalyticsState {
            db: s.db.clone(),
            chart_service: s.chart_service.clone(),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            db: s.db.clone(),
            event_bus: s.event_bus.clone(),
            started_at: s.started_at.clone(),
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Admin token returned by POST /api/login"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "admin_header",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Admin-Token"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::health_check,
        sse::notifications::sse_events_handler,
        rates::list_rates,
        rates::rate_series,
        rates::rate_series_multi,
        rates::public_rates,
        rates::admin_list_rates,
        rates::create_rate,
        rates::update_rate,
        rates::delete_rate,
        meta::list_states,
        meta::list_mandis,
        announcements::list_announcements,
        announcements::create_announcement,
        announcements::update_announcement,
        announcements::delete_announcement,
        announcements::public_announcements,
        market_updates::list_market_updates,
        market_updates::create_market_update,
        market_updates::update_market_update,
        market_updates::delete_market_update,
        media::list_media,
        media::create_media,
        settings::admin_settings,
        settings::put_setting,
        settings::public_settings,
        contact::submit_contact,
        analytics::analytics,
        auth::login,
        auth::logout,
        auth::session,
    ),
    components(
        schemas(
            IdResponse,
            Rate,
            RateListing,
            RateCard,
            rates::CreateRateRequest,
            rates::UpdateRateRequest,
            rates::RateListResponse,
            rates::SeriesResponse,
            rates::MultiSeriesResponse,
            rates::PublicRatesResponse,
            rates::PublicRatesUnavailable,
            meta::StatesResponse,
            meta::MandisResponse,
            announcements::CreateAnnouncementRequest,
            announcements::UpdateAnnouncementRequest,
            announcements::PublicAnnouncements,
            market_updates::CreateMarketUpdateRequest,
            market_updates::UpdateMarketUpdateRequest,
            media::CreateMediaRequest,
            settings::PutSettingRequest,
            settings::SettingDto,
            contact::ContactRequest,
            analytics::AnalyticsResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::SessionStatus,
            health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database probe"),
        (name = "Events", description = "Server-sent rate change notifications"),
        (name = "Rates", description = "Public rate listings, charts and price board"),
        (name = "Admin Rates", description = "Create, reprice, edit and delete rate rows"),
        (name = "Lookups", description = "States and mandis, with a built-in fallback"),
        (name = "Announcements", description = "Site notices and ticker"),
        (name = "Market Updates", description = "Daily market commentary"),
        (name = "Media", description = "Image, banner and document references"),
        (name = "Settings", description = "Key/value site settings"),
        (name = "Contact", description = "Buyer enquiries"),
        (name = "Analytics", description = "Back-office dashboard figures"),
        (name = "Authentication", description = "Admin login with a shared token"),
    ),
    info(
        title = "Onion Rates API",
        version = "1.0.0",
        description = "Daily onion market rates with a live change stream"
    )
)]
pub struct ApiDoc;

/// Build the full application router. `/metrics` is mounted only when a
/// Prometheus recorder handle is supplied.
pub fn create_api_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let admin_routes = Router::new()
        .route("/rates", get(rates::admin_list_rates).post(rates::create_rate))
        .route("/rates/{id}", put(rates::update_rate).delete(rates::delete_rate))
        .route(
            "/announcements",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .route(
            "/announcements/{id}",
            put(announcements::update_announcement).delete(announcements::delete_announcement),
        )
        .route(
            "/market-updates",
            get(market_updates::list_market_updates).post(market_updates::create_market_update),
        )
        .route(
            "/market-updates/{id}",
            put(market_updates::update_market_update).delete(market_updates::delete_market_update),
        )
        .route("/media", get(media::list_media).post(media::create_media))
        .route("/settings", get(settings::admin_settings).put(settings::put_setting))
        .route("/analytics", get(analytics::analytics))
        .route_layer(middleware::from_fn_with_state(
            state.admin.clone(),
            admin_auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/events", get(sse::sse_events_handler))
        .route("/rates", get(rates::list_rates))
        .route("/rates/series", get(rates::rate_series))
        .route("/rates/series/multi", get(rates::rate_series_multi))
        .route("/public/rates", get(rates::public_rates))
        .route("/public/announcements", get(announcements::public_announcements))
        .route("/public/settings", get(settings::public_settings))
        .route("/meta/states", get(meta::list_states))
        .route("/meta/mandis", get(meta::list_mandis))
        .route("/contact", post(contact::submit_contact))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
        .nest("/admin", admin_routes);

    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));

    if let Some(handle) = metrics_handle {
        app = app.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::events::{create_event_bus, EventKind, RateEvent};
    use crate::infrastructure::database::testing::test_db;

    const TOKEN: &str = "test-token";

    async fn test_app() -> (Router, AppState) {
        let state = AppState::new(
            test_db().await,
            create_event_bus(),
            AdminAuth::new("admin", "onions", TOKEN, false),
            StreamSettings { keepalive: Duration::from_secs(30), subscriber_buffer: 16 },
            ShutdownSignal::new(),
        );
        (create_api_router(state.clone(), None), state)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, json)
    }

    fn domestic(price: f64) -> Value {
        json!({
            "date": "2025-05-01",
            "rateType": "DOMESTIC",
            "stateId": 1,
            "mandiId": 1,
            "quality": "HIGH",
            "sizeMm": 55,
            "packing": "BAG",
            "pricePerKg": price
        })
    }

    #[tokio::test]
    async fn admin_routes_require_the_token() {
        let (app, _) = test_app().await;
        let (status, _, body) = call(&app, "POST", "/api/admin/rates", Some(domestic(20.0)), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _, _) = call(&app, "GET", "/api/admin/rates", None, Some("wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_returns_token_and_session_cookie() {
        let (app, _) = test_app().await;
        let creds = json!({"username": "admin", "password": "onions"});
        let (status, headers, body) = call(&app, "POST", "/api/login", Some(creds), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["token"], TOKEN);
        let cookie = headers[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("session=test-token;"));

        let bad = json!({"username": "admin", "password": "garlic"});
        let (status, _, _) = call(&app, "POST", "/api/login", Some(bad), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, _, body) = call(&app, "GET", "/api/session", None, Some(TOKEN)).await;
        assert_eq!(body["data"]["authenticated"], true);
        let (_, _, body) = call(&app, "GET", "/api/session", None, None).await;
        assert_eq!(body["data"]["authenticated"], false);
    }

    #[tokio::test]
    async fn rate_writes_publish_one_event_each() {
        let (app, state) = test_app().await;
        let mut stream = state.event_bus.subscribe_channel(8);

        let (status, _, body) =
            call(&app, "POST", "/api/admin/rates", Some(domestic(20.0)), Some(TOKEN)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_i64().unwrap() as i32;
        assert_eq!(stream.try_recv(), Some(RateEvent::created(id)));

        // Same natural key: repriced in place.
        let (status, _, body) =
            call(&app, "POST", "/api/admin/rates", Some(domestic(22.5)), Some(TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id);
        assert_eq!(body["data"]["pricePerKg"], 22.5);
        assert_eq!(stream.try_recv(), Some(RateEvent::updated(id)));

        let uri = format!("/api/admin/rates/{id}");
        let (status, _, body) =
            call(&app, "PUT", &uri, Some(json!({"sizeMm": 60})), Some(TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["sizeMm"], 60);
        assert_eq!(stream.try_recv(), Some(RateEvent::updated(id)));

        let (status, _, _) = call(&app, "DELETE", &uri, None, Some(TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stream.try_recv(), Some(RateEvent::deleted(id)));
        assert_eq!(stream.try_recv(), None);
    }

    #[tokio::test]
    async fn failed_writes_publish_nothing() {
        let (app, state) = test_app().await;
        let mut stream = state.event_bus.subscribe_channel(8);

        let (status, _, body) = call(&app, "DELETE", "/api/admin/rates/999", None, Some(TOKEN)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Rate not found");

        let (status, _, _) =
            call(&app, "PUT", "/api/admin/rates/999", Some(json!({"pricePerKg": 3})), Some(TOKEN)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let export_without_country = json!({
            "date": "2025-05-01", "rateType": "EXPORT", "sizeMm": 50,
            "packing": "BOX", "pricePerKg": 30
        });
        let (status, _, _) =
            call(&app, "POST", "/api/admin/rates", Some(export_without_country), Some(TOKEN)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) =
            call(&app, "POST", "/api/admin/rates", Some(domestic(0.0)), Some(TOKEN)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let wrong_mandi = json!({
            "date": "2025-05-01", "stateId": 1, "mandiId": 2, "quality": "LOW",
            "sizeMm": 40, "packing": "LOOSE", "pricePerKg": 12
        });
        let (status, _, _) =
            call(&app, "POST", "/api/admin/rates", Some(wrong_mandi), Some(TOKEN)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(stream.try_recv(), None);
        assert_eq!(state.event_bus.listener_count(EventKind::Created), 1);
    }

    #[tokio::test]
    async fn public_listing_carries_names_and_pagination() {
        let (app, _) = test_app().await;
        call(&app, "POST", "/api/admin/rates", Some(domestic(20.0)), Some(TOKEN)).await;

        let (status, headers, body) = call(&app, "GET", "/api/rates?stateId=&pageSize=5", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(body["pagination"], json!({"total": 1, "page": 1, "pageSize": 5, "totalPages": 1}));
        assert_eq!(body["data"][0]["state"]["name"], "Maharashtra");
        assert_eq!(body["data"][0]["mandi"]["name"], "Lasalgaon");
        assert!(body["lastUpdated"].is_string());

        let (_, _, body) = call(&app, "GET", "/api/rates/series", None, None).await;
        assert_eq!(body["data"][0], json!({"date": "2025-05-01", "avgPrice": 20.0, "count": 1}));

        let (status, _, body) = call(&app, "GET", "/api/public/rates", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["location"], "Lasalgaon, Maharashtra");
        assert_eq!(body["data"][0]["quality"], "Premium");
    }

    #[tokio::test]
    async fn lookups_and_ops_endpoints() {
        let (app, _) = test_app().await;

        let (status, _, body) = call(&app, "GET", "/api/meta/states", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["source"], "database");
        assert_eq!(body["data"][0]["name"], "Gujarat");

        let (_, _, body) = call(&app, "GET", "/api/meta/mandis?stateId=1", None, None).await;
        assert_eq!(body["data"], json!([{"id": 1, "name": "Lasalgaon", "stateId": 1}]));
        assert_eq!(body["metadata"]["stateId"], 1);

        let (status, headers, body) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(headers.contains_key("x-request-id"));

        let (status, _, body) = call(&app, "GET", "/api-doc/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/admin/rates/{id}"].is_object());

        let (status, _, _) = call(&app, "GET", "/api/admin/nothing", None, Some(TOKEN)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn analytics_counts_rates_and_announcements() {
        let (app, _) = test_app().await;
        let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
        let mut rate = domestic(18.0);
        rate["date"] = json!(today);
        call(&app, "POST", "/api/admin/rates", Some(rate), Some(TOKEN)).await;
        let notice = json!({"title": "Holiday", "body": "Mandi closed Friday", "published": true});
        call(&app, "POST", "/api/admin/announcements", Some(notice), Some(TOKEN)).await;

        let (status, _, body) = call(&app, "GET", "/api/admin/analytics", None, Some(TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["todayAvg"], 18.0);
        assert_eq!(body["last7"], json!([{"date": today, "avg": 18.0}]));
        assert_eq!(body["counts"], json!({"announcementsTotal": 1, "ratesTotal": 1}));
    }
}
