//! The binary for serving the JSON API.

use std::{
    fs::File,
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use axum::{body::Body, http::Request};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{filter::LevelFilter, prelude::*};

use fintrack_rs::{AppState, build_router, db, graceful_shutdown, logging};

#[derive(Parser)]
#[command(version, about = "Serves the income and expense tracking API.")]
struct Args {
    /// The path to the SQLite database file. The file and its tables are
    /// created if they do not exist.
    #[arg(long, default_value = "fintrack.db")]
    db_path: PathBuf,

    /// The port to serve the API on.
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

/// Log INFO and above to stdout, and everything from DEBUG up to the file
/// `debug.log` in the working directory.
fn set_up_logging() -> std::io::Result<()> {
    let log_file = File::create("debug.log")?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(LevelFilter::INFO);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}

fn open_database(db_path: &PathBuf) -> Result<Connection, Box<dyn std::error::Error>> {
    let connection = Connection::open(db_path)?;

    let table_count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'user'",
        (),
        |row| row.get(0),
    )?;

    if table_count == 0 {
        db::initialize(&connection)?;
        tracing::info!("created the database tables in {}", db_path.display());
    }

    Ok(connection)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    set_up_logging()?;

    let jwt_secret = std::env::var("SECRET")
        .map_err(|_| "the SECRET environment variable must be set to sign auth tokens")?;

    let connection = open_database(&args.db_path)?;
    let state = AppState::new(connection, &jwt_secret);

    let app = build_router(state)
        .layer(axum::middleware::from_fn(logging::log_request_response))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::debug_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        );

    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    tracing::info!("serving the API on http://{address}");

    axum_server::bind(address)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
