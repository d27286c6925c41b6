//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    timezone::today_in,
    transaction::{
        Category, Transaction,
        core::{MANUAL_SOURCE, create_transaction},
    },
};

/// The state needed to get or create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jerusalem".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The date when the transaction ocurred.
    pub date: Date,
    /// The value of the transaction in euros, the sign is ignored.
    pub amount: f64,
    /// One of "income", "expense" or "maaser_given".
    pub category: String,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// Where the transaction came from, defaults to "Manual".
    #[serde(default)]
    pub source: Option<String>,
    /// An optional annotation.
    #[serde(default)]
    pub note: Option<String>,
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = match today_in(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    if form.date > today {
        tracing::error!("Tried to create a transaction with the future date {}", form.date);
        return Error::FutureDate(form.date).into_alert_response();
    }

    let category: Category = match form.category.parse() {
        Ok(category) => category,
        Err(error) => return error.into_alert_response(),
    };

    let source = form
        .source
        .as_deref()
        .map(str::trim)
        .filter(|source| !source.is_empty())
        .unwrap_or(MANUAL_SOURCE);

    let transaction = Transaction::build(
        category.signed_amount(form.amount),
        form.date,
        form.description.as_deref().unwrap_or_default().trim(),
        category,
    )
    .source(source)
    .note(form.note.as_deref().unwrap_or_default());

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(transaction, &connection) {
        Ok(transaction) => {
            tracing::info!(
                "Created {} transaction {} for {}",
                transaction.category,
                transaction.id,
                transaction.amount
            );
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            return error.into_alert_response();
        }
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
