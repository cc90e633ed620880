use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    AppState,
    auth::RequestSession,
    models::{AuthState, RouteSummary, ShellView},
    shell::compose,
};

/// ResolveQuery
///
/// Query parameters for GET /shell/resolve.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ResolveQuery {
    /// The location being navigated to; may include a query string.
    pub path: String,
}

// --- Handlers ---

/// health
///
/// [Public Route] Liveness probe for monitoring and load balancer checks.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// get_session
///
/// [Public Route] Reports the caller's session as the shell sees it. Never fails:
/// anything that cannot be verified is reported as `signed_out`.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Current auth state", body = AuthState))
)]
pub async fn get_session(RequestSession(auth): RequestSession) -> Json<AuthState> {
    Json(auth)
}

/// resolve_navigation
///
/// [Public Route] Composes the view for `path` under the caller's session: which chrome,
/// what the guard decided, what renders and where a redirect would go. The caller is
/// always resolved on the server, so the outcome is never `pending` here.
#[utoipa::path(
    get,
    path = "/shell/resolve",
    params(ResolveQuery),
    responses((status = 200, description = "Composed shell view", body = ShellView))
)]
pub async fn resolve_navigation(
    RequestSession(auth): RequestSession,
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Json<ShellView> {
    let composition = compose(&state.routes, &state.config.routing, &query.path, &auth);
    tracing::debug!(path = %composition.path, outcome = ?composition.outcome, "navigation resolved");
    Json(composition.into_view(false))
}

/// list_routes
///
/// [Public Route] The declared route table, in match order.
#[utoipa::path(
    get,
    path = "/shell/routes",
    responses((status = 200, description = "Declared routes", body = [RouteSummary]))
)]
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    Json(state.routes.summaries())
}
