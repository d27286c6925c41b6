//! Defines the endpoints for deleting one or several transactions.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::{Connection, params_from_iter};
use serde::Deserialize;

use crate::{AppState, Error, alert::Alert, database_id::TransactionId, endpoints};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, responds with an alert.
///
/// The alert is swapped out-of-band, so the table row targeted by the
/// request is replaced with nothing.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, &connection) {
        Ok(0) => Error::DeleteMissingTransaction.into_alert_response(),
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(_) => {
            tracing::info!("Deleted transaction {transaction_id}");
            Alert::SuccessSimple {
                message: "Transaction deleted".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// The checked rows of the transactions table.
#[derive(Debug, Default, Deserialize)]
pub struct BulkDeleteForm {
    #[serde(default)]
    selected_ids: Vec<TransactionId>,
}

/// A route handler for deleting all the selected transactions, reloads the
/// transactions page on success.
pub async fn bulk_delete_transactions_endpoint(
    State(state): State<DeleteTransactionState>,
    Form(form): Form<BulkDeleteForm>,
) -> Response {
    if form.selected_ids.is_empty() {
        return Alert::Warning {
            message: "No transactions selected".to_owned(),
            details: "Tick the transactions you want to delete first.".to_owned(),
        }
        .into_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transactions(&form.selected_ids, &connection) {
        Ok(rows_affected) => {
            tracing::info!(
                "Deleted {rows_affected} of {} selected transactions",
                form.selected_ids.len()
            );
            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transactions: {error}");
            error.into_alert_response()
        }
    }
}

type RowsAffected = usize;

fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id",
            &[(":id", &id)],
        )
        .map_err(|err| err.into())
}

fn delete_transactions(
    ids: &[TransactionId],
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let placeholders = vec!["?"; ids.len()].join(", ");

    connection
        .execute(
            &format!("DELETE FROM \"transaction\" WHERE id IN ({placeholders})"),
            params_from_iter(ids),
        )
        .map_err(|err| err.into())
}
