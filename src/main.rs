use std::sync::Arc;

use portal_shell::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{MockProfileStore, PostgresProfileStore, ProfileStoreState},
    routes::RouteTable,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Initializes configuration, logging, the profile store and the route table, then
/// serves the shell API.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("FATAL: {error}");
            std::process::exit(1);
        }
    };

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portal_shell=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Route Table (validated before anything binds).
    let routes = RouteTable::standard(&config.routing);
    if let Err(error) = routes.check_redirect_targets(&config.routing) {
        tracing::error!(%error, "invalid route configuration");
        std::process::exit(1);
    }

    // 4. Profile Store
    let profiles = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");
            Arc::new(PostgresProfileStore::new(pool)) as ProfileStoreState
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using an empty in-memory profile store");
            Arc::new(MockProfileStore::new()) as ProfileStoreState
        }
    };

    // 5. Router and Server Startup
    let app = create_router(AppState {
        profiles,
        routes: Arc::new(routes),
        config: config.clone(),
    });

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("FATAL: Failed to bind listener. Check PORTAL_BIND_ADDR.");

    tracing::info!("Listening on {}", config.bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(error) = axum::serve(listener, app).await {
        tracing::error!(%error, "server terminated");
    }
}
