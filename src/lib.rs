//! A JSON API server for tracking personal income and expenses.
//!
//! Users register with an email address and password, log in to receive a
//! bearer token, and record their income and expenses as transactions
//! labelled with user-defined categories. The reporting endpoints reduce the
//! ledger into per-day summaries for a month, the data behind the client's
//! dashboard.
//!
//! Data is stored in SQLite. The binary target `server` serves the API.

#![warn(missing_docs)]

pub mod auth;
pub mod db;
pub mod endpoints;
mod error;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod report;
pub mod routes;
mod state;

pub use error::Error;
pub use routes::build_router;
pub use state::AppState;

use axum_server::Handle;
use tokio::signal;

/// Shut down the server gracefully on Ctrl+C or SIGTERM, giving in-flight
/// requests ten seconds to finish.
pub async fn graceful_shutdown(handle: Handle) {
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

    tracing::info!("received shutdown signal");
    handle.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
}
