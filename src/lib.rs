use std::sync::Arc;

use axum::{Router, extract::FromRef, http::HeaderName, routing::get};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access-control and layout core (single-threaded, no I/O).
pub mod guard;
pub mod layout;
pub mod page_tag;
pub mod shell;
pub mod store;
pub mod viewport;

// Collaborator seams and their in-memory implementations.
pub mod navigation;
pub mod session;

// Static page map, segregated by access level (Public, Authenticated, Admin).
pub mod routes;

// Server-side session resolution and HTTP surface.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// --- Public Re-exports ---

pub use config::{AppConfig, RoutingConfig};
pub use error::{ConfigError, ShellError};
pub use repository::{MockProfileStore, PostgresProfileStore, ProfileStoreState};
pub use routes::RouteTable;
pub use shell::{AppShell, ShellContext, ShellEvent, compose};

/// ApiDoc
///
/// Auto-generates the OpenAPI document for the shell API, served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::get_session, handlers::resolve_navigation,
        handlers::list_routes
    ),
    components(
        schemas(
            models::AuthState, models::Identity, models::Role, models::RouteRequirement,
            models::RedirectReason, models::GuardOutcome, models::LayoutKind, models::PageTag,
            models::PageId, models::Content, models::ChromeFrame, models::ShellView,
            models::RouteSummary,
        )
    ),
    tags(
        (name = "portal-shell", description = "Route access control and layout composition")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable container for everything the handlers need.
#[derive(Clone)]
pub struct AppState {
    /// Where session roles are looked up.
    pub profiles: ProfileStoreState,
    /// The declared page routes, built once at startup.
    pub routes: Arc<RouteTable>,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for ProfileStoreState {
    fn from_ref(app_state: &AppState) -> ProfileStoreState {
        app_state.profiles.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the observability layers and registers
/// the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health))
        .route("/session", get(handlers::get_session))
        .route("/shell/resolve", get(handlers::resolve_navigation))
        .route("/shell/routes", get(handlers::list_routes))
        .with_state(state);

    // Observability and Correlation Layers (applied outermost).
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by the layer above so
/// every log line of one request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
