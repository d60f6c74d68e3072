use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use hosteldesk::api::{self, AppState};
use hosteldesk::config::Config;
use hosteldesk::notify::{NoopNotifier, Notifier, SmtpNotifier};
use hosteldesk::ComplaintStore;

#[derive(Parser)]
#[command(name = "hosteldesk", version, about = "Hostel complaint tracking service")]
struct Cli {
    /// Port to listen on (overrides HOSTELDESK_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Database file path (overrides HOSTELDESK_DB)
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> hosteldesk::Result<()> {
    let mut config = Config::load();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(db) = cli.db {
        config.database = db;
    }

    info!("Opening store at {}", config.database.display());
    let store = ComplaintStore::open(&config.database)?;

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
        None => {
            warn!("SMTP not configured, email notifications disabled");
            Arc::new(NoopNotifier)
        }
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static("x-user-id"),
            HeaderName::from_static("x-user-role"),
        ])
        .max_age(Duration::from_secs(60 * 60));

    let app = api::router(AppState::new(store, notifier)).layer(cors);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
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
