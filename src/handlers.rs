use crate::{
    AppState,
    auth::{AuthSession, SessionReading},
    backend::BackendError,
    gate::{GateOutcome, RedirectDecision, decide_redirect},
    models::{AdminOverview, Notification, ProfileResponse, RedirectResponse, ThreadView, VisitReport},
    roles::{LOGIN_ROUTE, Role},
    thread::render_thread,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use uuid::Uuid;

// --- Query Structs ---

/// RedirectQuery
///
/// Query parameters accepted by the redirect endpoint. `?json=true` selects
/// programmatic mode, equivalent to the `X-Prefer-Json: true` header.
///
/// The value is kept as a raw string and compared leniently: the gate must
/// always terminate in a routing outcome, so a malformed value (`?json=1`,
/// `?json=yes`) selects browser mode instead of rejecting the request
/// before the decision runs.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct RedirectQuery {
    pub json: Option<String>,
}

/// Maps a backend failure to the gateway's own response: the upstream status
/// passes through and the upstream body is surfaced verbatim.
fn upstream_error(e: BackendError) -> (StatusCode, String) {
    let status = e.status_code();
    match e {
        BackendError::Upstream { body, .. } => (status, body),
        BackendError::Transport(msg) => (status, msg),
    }
}

/// True when the caller asked for a structured result instead of an HTTP
/// redirect, via header or query string.
fn prefers_json(headers: &HeaderMap, query: &RedirectQuery) -> bool {
    let header_set = headers
        .get("x-prefer-json")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    header_set
        || query
            .json
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

// --- Handlers ---

/// resolve_redirect
///
/// [Public Route] The redirect gate endpoint, `GET|POST /api/redirect`.
///
/// Computes where the caller belongs: login route when unauthenticated or
/// expired, otherwise the landing route of the resolved role. Browser
/// navigation gets a 307 (marked `no-store` so the decision is never
/// cached); programmatic callers get `{"redirectUrl": ...}` and navigate
/// themselves.
///
/// *Side effect*: an expired session additionally triggers a best-effort
/// sign-out against the session provider. Its failure is logged, never
/// surfaced; the user lands on the login page either way.
#[utoipa::path(
    get,
    path = "/api/redirect",
    params(RedirectQuery),
    responses(
        (status = 307, description = "Browser navigation redirect"),
        (status = 200, description = "Programmatic redirect target", body = RedirectResponse)
    )
)]
pub async fn resolve_redirect(
    session: SessionReading,
    State(state): State<AppState>,
    Query(query): Query<RedirectQuery>,
    headers: HeaderMap,
) -> Response {
    let now_ms = chrono::Utc::now().timestamp_millis();

    let decision = match decide_redirect(&session.state, now_ms) {
        GateOutcome::Redirect(decision) => decision,
        // Server side, the auth check has always completed by the time the
        // handler runs. Should a pending state ever surface here, the caller
        // must still receive a routing outcome, and login is the safe one.
        GateOutcome::Pending => RedirectDecision {
            destination: LOGIN_ROUTE,
            sign_out: false,
        },
    };

    if decision.sign_out {
        if let Some(token) = session.token {
            let backend = state.backend.clone();
            // Best effort, off the request path.
            tokio::spawn(async move {
                if let Err(e) = backend.sign_out(&token).await {
                    tracing::warn!("sign-out for expired session failed: {}", e);
                }
            });
        }
    }

    if prefers_json(&headers, &query) {
        return Json(RedirectResponse {
            redirect_url: decision.destination.to_string(),
        })
        .into_response();
    }

    let mut response = Redirect::temporary(decision.destination).into_response();
    // A redirect decision is per-session; it must never be cached by the
    // browser or an intermediary.
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// get_me
///
/// [Authenticated Route] The authenticated user's profile together with the
/// role this gateway resolved for it. The role is re-derived on every call,
/// never cached.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = ProfileResponse))
)]
pub async fn get_me(session: AuthSession) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        id: session.profile.id,
        display_name: crate::roles::display_name(&session.profile),
        avatar_url: session.profile.avatar_url.clone(),
        role: session.role,
    })
}

/// get_thread
///
/// [Authenticated Route] Fetches a forum thread from the backend and returns
/// the rendered, depth-clamped reply tree.
#[utoipa::path(
    get,
    path = "/forum/threads/{id}",
    params(("id" = Uuid, Path, description = "Thread root message ID")),
    responses(
        (status = 200, description = "Rendered thread", body = ThreadView),
        (status = 404, description = "Unknown thread")
    )
)]
pub async fn get_thread(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ThreadView>, (StatusCode, String)> {
    let root = state
        .backend
        .fetch_thread(id, &session.token)
        .await
        .map_err(upstream_error)?;
    Ok(Json(render_thread(&root)))
}

/// get_notifications
///
/// [Authenticated Route] Proxies the caller's notification list. A backend
/// failure is surfaced to the UI layer for a visible retry affordance.
#[utoipa::path(
    get,
    path = "/notifications",
    responses((status = 200, description = "My notifications", body = [Notification]))
)]
pub async fn get_notifications(
    session: AuthSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, (StatusCode, String)> {
    let notifications = state
        .backend
        .fetch_notifications(&session.token)
        .await
        .map_err(upstream_error)?;
    Ok(Json(notifications))
}

/// report_visit
///
/// [Authenticated Route] Non-critical visit telemetry. Always answers 202:
/// a lost visit record fails silently by design.
#[utoipa::path(
    post,
    path = "/visits",
    request_body = VisitReport,
    responses((status = 202, description = "Accepted"))
)]
pub async fn report_visit(
    session: AuthSession,
    State(state): State<AppState>,
    Json(payload): Json<VisitReport>,
) -> StatusCode {
    state
        .backend
        .track_visit(&payload.path, &session.token)
        .await;
    StatusCode::ACCEPTED
}

/// get_admin_overview
///
/// [Admin Route] Counters for the admin landing surface.
///
/// *RBAC*: strict enforcement of the resolved `Admin` role before the
/// backend is consulted.
#[utoipa::path(
    get,
    path = "/admin/overview",
    responses(
        (status = 200, description = "Overview", body = AdminOverview),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_admin_overview(
    session: AuthSession,
    State(state): State<AppState>,
) -> Result<Json<AdminOverview>, (StatusCode, String)> {
    if session.role != Role::Admin {
        return Err((StatusCode::FORBIDDEN, String::new()));
    }
    let overview = state
        .backend
        .fetch_admin_overview(&session.token)
        .await
        .map_err(upstream_error)?;
    Ok(Json(overview))
}
