//! jwp-wf (Workflow Engine) - editorial workflow service
//!
//! Submission intake, reviewer/editor assignment, status state machine and
//! review aggregation for the journal portal, served over HTTP against the
//! shared jwp.db.

use anyhow::Result;
use clap::Parser;
use jwp_common::config;
use jwp_common::events::EventBus;
use jwp_wf::notify::{self, Mailer};
use jwp_wf::{build_router, db, AppState};
use tracing::info;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "jwp-wf", about = "JWP editorial workflow engine")]
struct Args {
    /// Root folder holding jwp.db (overrides JWP_ROOT_FOLDER and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Override the HTTP port from the settings table
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init, before any
    // database delays
    info!(
        "Starting JWP Workflow Engine (jwp-wf) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref());
    config::ensure_root_folder(&root_folder)?;
    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = jwp_common::db::init_database(&db_path).await?;
    info!("✓ Database ready");

    // Event bus + notification dispatcher (email stays off the request path)
    let capacity = db::settings::event_bus_capacity(&pool).await?;
    let event_bus = EventBus::new(capacity);

    let mailer = Mailer::new(
        db::settings::mail_gateway_url(&pool).await?,
        db::settings::mail_from_address(&pool).await?,
    );
    if mailer.delivery_enabled() {
        info!("✓ Mail delivery enabled");
    } else {
        info!("Mail delivery disabled (mail_gateway_url not set)");
    }
    tokio::spawn(notify::run_dispatcher(
        event_bus.clone(),
        pool.clone(),
        mailer,
    ));

    // Create application state and router
    let state = AppState::new(pool.clone(), event_bus);
    let app = build_router(state);

    let (host, settings_port) = db::settings::http_bind(&pool).await?;
    let port = args.port.unwrap_or(settings_port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("jwp-wf listening on http://{}:{}", host, port);
    info!("Health check: http://{}:{}/health", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}
