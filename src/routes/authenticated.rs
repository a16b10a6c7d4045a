use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes accessible to any user with a validated session, whatever their
/// role. Every handler here relies on the `AuthSession` extractor middleware
/// layered above this module, which guarantees the handler receives a
/// resolved profile and role.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The caller's profile plus the role this gateway resolved for it.
        .route("/me", get(handlers::get_me))
        // GET /forum/threads/{id}
        // A forum thread rendered as the flattened, depth-clamped reply tree
        // the front end displays. Order comes from the backend untouched.
        .route("/forum/threads/{id}", get(handlers::get_thread))
        // GET /notifications
        // Proxy for the caller's notification list.
        .route("/notifications", get(handlers::get_notifications))
        // POST /visits
        // Fire-and-forget visit telemetry. Always answers 202.
        .route("/visits", post(handlers::report_visit))
}
