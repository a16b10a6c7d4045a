use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Public Router Module
///
/// Endpoints reachable without authentication. The redirect gate lives here
/// deliberately: an unauthenticated caller must still get a routing outcome
/// (the login route), never a 401.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated endpoint for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET|POST /api/redirect?json=true
        // The redirect gate. Examines the session (absent, expired, or live),
        // resolves the role, and answers with a 307 for browser navigation or
        // a JSON payload when `X-Prefer-Json: true` / `?json=true` is set.
        // POST is accepted so programmatic callers can avoid caches entirely.
        .route(
            "/api/redirect",
            get(handlers::resolve_redirect).post(handlers::resolve_redirect),
        )
}
