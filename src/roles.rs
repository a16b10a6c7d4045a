use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::{EducationLevel, UserProfile};

/// Route users land on when no authenticated session exists (or it expired).
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Role
///
/// The coarse access-level category for a user. Roles are derived, never
/// stored: every access decision re-derives the role from the profile flags
/// via [`resolve_role`], so a profile change takes effect on the next check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// The canonical landing route for this role, consumed by both the
    /// `/api/redirect` endpoint and the front-end client hook.
    pub fn landing_route(self) -> &'static str {
        match self {
            Role::Student => "/students",
            Role::Teacher => "/dashboard",
            Role::Admin => "/admin",
        }
    }
}

/// resolve_role
///
/// Derives the [`Role`] for a profile. Pure, deterministic, and total: every
/// possible `UserProfile` maps to exactly one role.
///
/// The priority ordering is security relevant and must not be rearranged:
///
/// 1. `is_superuser` or `is_staff` wins over any education-level signal,
///    because the admin flags are an administrative override.
/// 2. `PROFESSIONAL` marks a teacher; the backend has no explicit teacher
///    flag, so this is the only teacher signal.
/// 3. The known student levels map to `Student`.
/// 4. Anything else falls through to `Student`, the least-privileged role.
///    An unrecognized level is logged but can neither fail resolution nor
///    silently grant elevated access.
pub fn resolve_role(profile: &UserProfile) -> Role {
    if profile.is_superuser || profile.is_staff {
        return Role::Admin;
    }

    match profile.education_level {
        EducationLevel::Professional => Role::Teacher,
        EducationLevel::College | EducationLevel::Lycee | EducationLevel::University => {
            Role::Student
        }
        EducationLevel::Unknown => {
            tracing::warn!(user_id = %profile.id, "unrecognized education level, defaulting to student role");
            Role::Student
        }
    }
}

/// display_name
///
/// Joins the available name fields of a profile, falling back to a stable
/// placeholder when both are missing.
pub fn display_name(profile: &UserProfile) -> String {
    match (profile.first_name.as_deref(), profile.last_name.as_deref()) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (Some(first), None) => first.to_string(),
        (None, Some(last)) => last.to_string(),
        (None, None) => "Unknown user".to_string(),
    }
}
