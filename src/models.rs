use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mirrors of the REST Backend) ---

/// EducationLevel
///
/// The backend's education-level enumeration for a user profile. The wire
/// format uses SCREAMING_SNAKE_CASE strings (e.g. "COLLEGE", "PROFESSIONAL").
///
/// An unrecognized wire value must never fail deserialization: role resolution
/// has to stay total even when the backend introduces a new level. The
/// `#[serde(other)]` variant absorbs anything unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum EducationLevel {
    College,
    Lycee,
    University,
    /// Marks teaching staff. The backend has no explicit teacher flag, so this
    /// value is the only signal the role resolver has for the teacher role.
    Professional,
    /// Catch-all for values this gateway does not know about.
    #[serde(other)]
    #[default]
    Unknown,
}

/// UserProfile
///
/// The canonical user record fetched from the backend (`GET /users/me`).
/// This is the sole input to role resolution; the gateway never persists it
/// beyond the lifetime of one request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    /// Administrative override flag. Dominates any education-level signal.
    pub is_superuser: bool,
    /// Staff flag, treated identically to `is_superuser` for access purposes.
    pub is_staff: bool,
    #[serde(default)]
    pub education_level: EducationLevel,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Sender
///
/// Embedded author info on a forum message. Name fields are optional because
/// the backend allows incomplete profiles; the renderer degrades to a
/// placeholder rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Sender {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub profile_picture: Option<String>,
}

/// Message
///
/// A forum message as delivered by the backend. A top-level message carries
/// `replies` in display order; a reply carries a `parent` back-reference
/// (relation only, one level consulted for the quoted preview). The type
/// allows arbitrary recursion but the renderer clamps the visual depth.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    /// Kept as the raw backend string so an unparseable date can be displayed
    /// verbatim instead of aborting the render.
    pub created_at: String,
    /// Optional attachment URL, independently optional at every level.
    pub file: Option<String>,
    pub sender: Option<Sender>,
    #[serde(default)]
    #[schema(no_recursion)]
    pub parent: Option<Box<Message>>,
    #[serde(default)]
    #[schema(no_recursion)]
    pub replies: Vec<Message>,
}

// --- Rendered Thread Schemas (Output) ---

/// QuotedParent
///
/// Compact preview of the message a reply responds to: the parent's sender
/// name plus a truncated excerpt of its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct QuotedParent {
    pub author: String,
    pub excerpt: String,
}

/// ThreadNode
///
/// One rendered message in a flattened thread view. `indent` is the
/// presentational nesting level, already clamped by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ThreadNode {
    pub id: Uuid,
    /// Display name of the sender, or a placeholder when the sender record
    /// is missing or has no usable name fields.
    pub author: String,
    pub avatar_url: Option<String>,
    /// Human-formatted timestamp, or the raw backend string when parsing fails.
    pub posted_at: String,
    pub content: String,
    pub attachment: Option<String>,
    pub indent: usize,
    pub in_reply_to: Option<QuotedParent>,
}

/// ThreadView
///
/// The fully rendered thread returned by `GET /forum/threads/{id}`:
/// the root message followed by every reply, in backend order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ThreadView {
    pub id: Uuid,
    pub messages: Vec<ThreadNode>,
}

// --- Redirect & Profile Schemas (Output) ---

/// RedirectResponse
///
/// JSON body returned by `/api/redirect` in programmatic mode. The camelCase
/// key is part of the front-end contract.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RedirectResponse {
    #[serde(rename = "redirectUrl")]
    #[ts(rename = "redirectUrl")]
    pub redirect_url: String,
}

/// ProfileResponse
///
/// Output schema for `GET /me`: the backend profile enriched with the role
/// this gateway resolved for it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: crate::roles::Role,
}

// --- Notification Schemas ---

/// Notification
///
/// A notification record proxied through from the backend, UI ready.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Telemetry Schemas (Input) ---

/// VisitReport
///
/// Input payload for the fire-and-forget visit tracking endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VisitReport {
    /// The front-end route that was visited, e.g. "/students".
    pub path: String,
}

// --- Admin Schemas (Output) ---

/// AdminOverview
///
/// Output schema for the admin landing surface (`GET /admin/overview`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminOverview {
    pub total_users: i64,
    pub total_courses: i64,
    pub open_threads: i64,
}
