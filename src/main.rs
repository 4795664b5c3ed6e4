use std::net::SocketAddr;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use barbershift::auth::service;
use barbershift::config::Config;
use barbershift::session::{self, SessionSweeper};
use barbershift::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting BarberShift ({:?})", config.environment);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations applied");

    let store = session::open_store(pool.clone()).await?;
    let sweeper = SessionSweeper::spawn(store.clone(), config.session_cleanup_interval);

    if let Some(seed) = &config.admin {
        service::ensure_admin(&pool, seed).await?;
    }

    let addr = SocketAddr::new(config.host, config.port);
    let state = match AppState::new(pool.clone(), config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("{e}");
            sweeper.stop();
            pool.close().await;
            return Err(e.into());
        }
    };
    let app = barbershift::build_app(state, store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("serving on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.stop();
    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
