//! Route guard: decides whether a requested page may render.
//!
//! The decision is a pure function of the route's requirement and the current
//! session state. Nothing is cached; the shell calls it again on every path or
//! session change.

use crate::{
    config::RoutingConfig,
    error::ShellError,
    models::{AuthState, GuardOutcome, RedirectReason, Role, RouteRequirement},
    session::login_location,
};

/// evaluate
///
/// - `Public` always renders.
/// - Any protected route waits (`Pending`) while the session is `Unknown`.
/// - Signed-out users are sent to sign in.
/// - Members asking for admin routes are sent away as not authorized.
pub fn evaluate(requirement: RouteRequirement, auth: &AuthState) -> GuardOutcome {
    match (requirement, auth) {
        (RouteRequirement::Public, _) => GuardOutcome::Render,
        (_, AuthState::Unknown) => GuardOutcome::Pending,
        (_, AuthState::SignedOut) => GuardOutcome::Redirect(RedirectReason::SignInRequired),
        (RouteRequirement::RequiresAuth, AuthState::SignedIn(_)) => GuardOutcome::Render,
        (RouteRequirement::RequiresAdmin, AuthState::SignedIn(identity)) => {
            if identity.role == Role::Admin {
                GuardOutcome::Render
            } else {
                GuardOutcome::Redirect(RedirectReason::NotAuthorized)
            }
        }
    }
}

/// Same as `evaluate`, for callers holding the raw result of a session lookup.
/// A lookup that failed is gated exactly like `SignedOut`.
pub fn evaluate_resolution(
    requirement: RouteRequirement,
    resolution: &Result<AuthState, ShellError>,
) -> GuardOutcome {
    match resolution {
        Ok(auth) => evaluate(requirement, auth),
        Err(_) => evaluate(requirement, &AuthState::SignedOut),
    }
}

/// Concrete location for a redirect issued while `return_path` was requested.
pub fn redirect_location(reason: RedirectReason, return_path: &str, config: &RoutingConfig) -> String {
    match reason {
        RedirectReason::SignInRequired => login_location(&config.login_path, return_path),
        RedirectReason::NotAuthorized => config.unauthorized_path.clone(),
    }
}
