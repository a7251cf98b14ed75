//! Forbo is a self-hosted web app for simple bookkeeping.
//!
//! Transactions are recorded in named periods, e.g. fiscal years, each
//! with optional opening and closing balances. A transaction may carry an
//! attached file such as a scanned receipt, which is stored on disk next to
//! the SQLite database.
//!
//! This library provides a web server that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod amount;
mod app_state;
mod config;
mod current_period;
mod db;
mod endpoints;
mod error;
mod home_page;
mod html;
mod internal_server_error;
mod invoice;
mod logging;
mod navigation;
mod not_found;
mod notice;
mod period;
mod routing;
mod sanitize;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use config::SiteConfig;
pub use db::{initialize as initialize_db, open_store};
pub use error::Error;
pub use invoice::AttachmentStore;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use period::{NewPeriod, PeriodInsert, create_period, parse_period_name};
pub use routing::{UPLOAD_BODY_LIMIT, build_router};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
