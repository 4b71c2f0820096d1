// src/main.rs
use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use petition_backend::auth::Sessions;
use petition_backend::config::Config;
use petition_backend::db;
use petition_backend::routes;
use petition_backend::state::AppState;
use petition_backend::store::PgStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to the database");
    db::init_schema(&pool)
        .await
        .expect("Failed to apply the database schema");

    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        Sessions::new(&config.jwt_secret),
        config.voting_rules(),
    );
    let app = routes::create_routes(state);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .expect("Failed to bind the listen address");
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
