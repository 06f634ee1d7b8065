use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use projects_api::{config, database::DatabaseManager, routes};

#[derive(Parser)]
#[command(name = "projects-api", version, about = "Projects REST API")]
struct Args {
    #[arg(long, default_value = "0.0.0.0", help = "Address to bind")]
    host: String,

    #[arg(long, help = "Port to listen on (overrides PROJECTS_API_PORT, PORT and config)")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, SMTP_HOST, etc.
    let _ = dotenvy::dotenv();

    let default_filter = if projects_api::is_development!() {
        "info,projects_api=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let args = Args::parse();
    let config = config::config();
    tracing::info!("Starting projects-api in {:?} mode", config.environment);

    // Allow tests or deployments to override port via env
    let port = args
        .port
        .or_else(|| env_port("PROJECTS_API_PORT"))
        .or_else(|| env_port("PORT"))
        .unwrap_or(config.api.port);

    let bind_addr = format!("{}:{}", args.host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("projects-api listening on http://{}", bind_addr);

    axum::serve(listener, routes::app())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close_all().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn env_port(name: &str) -> Option<u16> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
