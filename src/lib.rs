//! Maaser is a web app for working out how much maaser (tithe) you owe.
//!
//! Transactions are entered by hand or read from uploaded bank statements by
//! a local language model. The dashboard shows the income received during the
//! current Gregorian or Hebrew year, the maaser given and the maaser still owed.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod error;
pub mod hebrew_calendar;
mod html;
mod import;
mod internal_server_error;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use dashboard::{FiscalPeriod, MaaserSummary};
pub use db::{SCHEMA_VERSION, initialize as initialize_db};
pub use error::Error;
pub use import::{
    CommandModel, DEFAULT_MODEL, DEFAULT_MODEL_COMMAND, DEFAULT_MODEL_TIMEOUT, LanguageModel,
    ModelError, ParsedTransaction, extract_transactions,
};
pub use routing::build_router;
pub use transaction::{Category, Transaction, TransactionBuilder, create_transaction};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for the Ctrl+C signal: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install the terminate signal handler: {error}");
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
