use crate::{
    models::UserProfile,
    roles::{LOGIN_ROUTE, resolve_role},
};

/// SessionState
///
/// The authentication state a redirect decision is computed from. The state
/// machine per invocation is:
///
/// `Loading -> {Unauthenticated, Expired, Authorized(role)} -> redirect`
///
/// `Loading` is a valid, non-terminal state (the auth check is still in
/// flight); every other state terminates in a concrete destination. There is
/// no state that leaves the caller without a routing outcome.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// The authentication check has not completed yet.
    #[default]
    Loading,
    /// No session user exists.
    Unauthenticated,
    /// A session user exists. Expiry is checked by the gate, not here.
    Authenticated {
        profile: UserProfile,
        /// Credential expiry, epoch milliseconds. Carried on the session,
        /// not the profile.
        expires_at: i64,
    },
}

/// RedirectDecision
///
/// Ephemeral navigation instruction produced per invocation; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectDecision {
    /// The route the caller must navigate to.
    pub destination: &'static str,
    /// True only for an expired session: the caller must additionally ask the
    /// session provider to invalidate the session. The gate itself performs
    /// no side effect.
    pub sign_out: bool,
}

/// GateOutcome
///
/// Result of one redirect-gate invocation. `Pending` is a suspension point,
/// not a failure: the caller waits for the auth check and invokes the gate
/// again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Pending,
    Redirect(RedirectDecision),
}

/// decide_redirect
///
/// The redirect gate. Maps a session state and the current time (epoch
/// milliseconds) to a navigation outcome.
///
/// The checks run in a fixed order, each depending on the previous step's
/// result: authentication, then expiry, then role, then destination. All
/// non-pending branches terminate in a concrete route; the function never
/// fails. Idempotent for a frozen state and clock.
pub fn decide_redirect(state: &SessionState, now_ms: i64) -> GateOutcome {
    match state {
        SessionState::Loading => GateOutcome::Pending,
        SessionState::Unauthenticated => GateOutcome::Redirect(RedirectDecision {
            destination: LOGIN_ROUTE,
            sign_out: false,
        }),
        SessionState::Authenticated {
            profile,
            expires_at,
        } => {
            if now_ms >= *expires_at {
                // Expired sessions land on login like unauthenticated ones;
                // the only difference is the sign-out obligation.
                return GateOutcome::Redirect(RedirectDecision {
                    destination: LOGIN_ROUTE,
                    sign_out: true,
                });
            }

            GateOutcome::Redirect(RedirectDecision {
                destination: resolve_role(profile).landing_route(),
                sign_out: false,
            })
        }
    }
}
