use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shindig::{api, config::Config, content::BuiltinContent, store};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shindig=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting shindig...");

    let config = Config::from_env();
    let port = config.port;

    let store = Arc::new(store::SessionStore::new(Box::new(BuiltinContent), config));

    // Background cleanup of idle sessions and silent players
    store::spawn_idle_sweeper(store.clone());

    let app = Router::new()
        .route("/api/session", post(api::session_action))
        .route("/api/session/{id}", get(api::get_session))
        .route("/api/session/by-code/{code}", get(api::get_session_by_code))
        .route("/api/session/{id}/events", get(api::session_events))
        .route("/api/games", get(api::list_games))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
