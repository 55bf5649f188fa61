//! Utsav Registration Server - Main entry point
//!
//! Festival registration backend: self-service and venue registration
//! submission with payment classification, plus the admin operations
//! around the registration store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use utsav_server::api::{build_router, AppContext};
use utsav_server::mail::{ConsoleMailer, Mailer, SmtpMailer};
use utsav_server::RegistrationEngine;

/// Command-line arguments for utsav-server
#[derive(Parser, Debug)]
#[command(name = "utsav-server")]
#[command(about = "Festival registration backend")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5730", env = "UTSAV_PORT")]
    port: u16,

    /// Folder holding the database and generated files
    #[arg(short, long)]
    data_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "utsav_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    let data_folder =
        utsav_common::config::resolve_data_folder(args.data_folder.as_deref(), "UTSAV_DATA_FOLDER")
            .context("Failed to resolve data folder")?;

    info!("Starting Utsav registration server on port {}", args.port);
    info!("Data folder: {}", data_folder.display());

    // Initialize database
    let db_path = utsav_common::config::database_path(&data_folder);
    let db_pool = utsav_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    // Admission engine
    let engine = Arc::new(RegistrationEngine::new(db_pool.clone()));

    // Mailer: SMTP when configured, log-only otherwise
    let mailer: Arc<dyn Mailer> = match SmtpMailer::from_env() {
        Some(smtp) => {
            info!("SMTP mailer configured");
            Arc::new(smtp)
        }
        None => {
            info!("No SMTP configuration found, using console mailer");
            Arc::new(ConsoleMailer)
        }
    };

    // Build the application router
    let ctx = AppContext { db_pool, engine, mailer };
    let app = build_router(ctx);

    // Create socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    // Create and run the server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
