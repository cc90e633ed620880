use thiserror::Error;

/// ShellError
///
/// Failures that can originate in the access-control and layout core.
///
/// None of these ever reach the user as a raw error: an unresolvable session is gated
/// exactly like a signed-out one, and an unmatched route renders the not-found view.
/// An authenticated member asking for an admin page is *not* an error at all; the guard
/// answers it with a normal `Redirect(NotAuthorized)` outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    /// The session source could not determine an identity (store unreachable, timeout, ...).
    #[error("session could not be resolved: {0}")]
    SessionUnresolvable(String),

    /// No declared route matches the requested path.
    #[error("no route matches `{0}`")]
    UnmatchedRoute(String),

    /// A redirect destination is declared behind a guard, which would loop forever.
    #[error("redirect target `{0}` must be a public route")]
    RedirectTargetNotPublic(String),
}

/// ConfigError
///
/// Returned by `AppConfig::load` when the environment is incomplete or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{var}=`{value}` is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}
