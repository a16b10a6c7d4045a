/// Router Module Index
///
/// Organizes the gateway's routing into security-segregated modules so access
/// control is applied explicitly at the module level (via Axum layers),
/// preventing accidental exposure of protected endpoints.

/// Routes accessible to all callers, including the redirect gate itself
/// (which must be reachable without a session to send anyone to login).
pub mod public;

/// Routes protected by the `AuthSession` extractor middleware.
/// Requires a validated session token.
pub mod authenticated;

/// Routes restricted exclusively to users resolving to the admin role.
pub mod admin;
