//! Labelhub API server binary.
//!
//! Opens the SQLite database, applies migrations, and serves the HTTP API
//! until interrupted.

use clap::Parser;
use labelhub_api::config::{ApiConfig, DEFAULT_BIND_ADDR};
use tracing::info;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "labelhub_api_server", about = "Labelhub API server", version)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    bind_addr: String,

    /// SQLite connection URL. Defaults to a file in the user data directory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 8)]
    max_connections: u32,

    /// Mark auth cookies `Secure` (HTTPS deployments).
    #[arg(long, env = "SECURE_COOKIES", default_value_t = false)]
    secure_cookies: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,labelhub_api=debug,labelhub_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let database_url = match args.database_url {
        Some(url) => url,
        None => labelhub_core::db::default_database_url()?,
    };
    let config = ApiConfig {
        bind_addr: args.bind_addr,
        secure_cookies: args.secure_cookies,
        ..ApiConfig::new(database_url)
    };

    info!(
        database_url = %config.database_url,
        max_connections = args.max_connections,
        "starting labelhub_api_server"
    );

    let pool = labelhub_core::db::connect(&config.database_url, args.max_connections).await?;

    info!("running database migrations");
    labelhub_api::migrate(&pool).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    let state = labelhub_api::AppState::new(pool.clone(), config);
    let app = labelhub_api::router(state);

    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
