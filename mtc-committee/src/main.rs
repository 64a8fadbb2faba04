//! mtc-committee - Committee consensus workflow service
//!
//! Serves the committee's proposal, voting, and catalog-management API
//! over the shared catalog database.

use anyhow::Result;
use clap::Parser;
use mtc_committee::{build_router, AppState};
use mtc_common::config;
use mtc_common::db::init_database;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mtc-committee", about = "Committee consensus workflow service")]
struct Args {
    /// Root folder holding the catalog database
    #[arg(long)]
    root_folder: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = 5730)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting MTC Committee Service v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), "MTC_ROOT_FOLDER");
    let db_path = config::database_path(&root_folder)?;
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("mtc-committee listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
