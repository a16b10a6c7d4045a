use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Routes for users whose profile resolves to the admin role (superuser or
/// staff flag set). Authentication happens in the layer above; the explicit
/// `Role::Admin` check happens inside each handler, so a student or teacher
/// reaching these paths gets a 403, not a 401.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/overview
        // Counters for the admin landing surface.
        .route("/overview", get(handlers::get_admin_overview))
}
