use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod backend;
pub mod config;
pub mod expiry;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod roles;
pub mod thread;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthSession;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the entry point (main.rs).
pub use backend::{BackendState, MockBackend, RestBackend};
pub use config::AppConfig;

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the gateway,
/// aggregating every path and schema decorated with the `utoipa` macros.
/// Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::resolve_redirect, handlers::get_me, handlers::get_thread,
        handlers::get_notifications, handlers::report_visit,
        handlers::get_admin_overview
    ),
    components(
        schemas(
            models::UserProfile, models::EducationLevel, models::Sender,
            models::Message, models::ThreadNode, models::ThreadView,
            models::QuotedParent, models::RedirectResponse,
            models::ProfileResponse, models::Notification, models::VisitReport,
            models::AdminOverview, roles::Role,
        )
    ),
    tags(
        (name = "classconnect-gateway", description = "ClassConnect front-end gateway API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all essential
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// The external REST backend every data operation is delegated to.
    pub backend: BackendState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Allow extractors and handlers to selectively pull components from the
// shared AppState.

impl FromRef<AppState> for BackendState {
    fn from_ref(app_state: &AppState) -> BackendState {
        app_state.backend.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the `authenticated_routes` and the nested
/// admin router. It attempts to extract `AuthSession` from the request; since
/// `AuthSession` implements `FromRequestParts`, a failed validation rejects
/// the request with 401 before any handler runs. The role check for admin
/// surfaces stays inside the handlers, so non-admins get a 403 there.
async fn auth_middleware(_session: AuthSession, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the gateway's routing structure, applies global and scoped
/// middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes, including the redirect gate: no middleware. The gate
        // does its own session reading and must never 401.
        .merge(public::public_routes())
        // Authenticated routes: protected by the auth middleware.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Admin routes: nested under '/admin', authenticated at the layer,
        // role-checked inside the handlers.
        .nest(
            "/admin",
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    // Observability and correlation layers, applied outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: wraps the request/response lifecycle in a
                // span carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes `TraceLayer` span creation: includes the `x-request-id` header
/// (if present) alongside the HTTP method and URI, so every log line for a
/// single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
