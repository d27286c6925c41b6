//! Defines the endpoint that imports the transactions found in an uploaded bank statement.
use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use axum::{
    body::Bytes,
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    import::{
        LanguageModel, ParsedTransaction, decode_document, document::allowed_extension,
        extract_transactions,
    },
    transaction::{Transaction, create_transaction},
};

/// The source recorded for transactions read from a statement by the model.
pub const AI_PARSED_SOURCE: &str = "AI Parsed";

/// The name of the multipart field that holds the statement.
const FILE_FIELD: &str = "file";

/// The state needed for importing transactions.
#[derive(Debug, Clone)]
pub struct ImportState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The model that reads the statements.
    pub model: Arc<dyn LanguageModel>,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            model: state.model.clone(),
        }
    }
}

/// Route handler for importing the transactions in an uploaded bank statement.
///
/// Responds with an alert that states how many transactions were imported.
pub async fn import_statement_endpoint(
    State(state): State<ImportState>,
    multipart: Multipart,
) -> Response {
    let start_time = Instant::now();

    let (extension, contents) = match read_statement_upload(multipart).await {
        Ok(upload) => upload,
        Err(error) => {
            tracing::debug!("Rejected statement upload: {error}");
            return error.into_alert_response();
        }
    };

    let model = state.model.clone();
    let extraction = tokio::task::spawn_blocking(move || {
        let text = decode_document(&contents, &extension)?;
        extract_transactions(model.as_ref(), &text)
    })
    .await;

    let parsed_transactions = match extraction {
        Ok(Ok(parsed_transactions)) => parsed_transactions,
        Ok(Err(error)) => {
            tracing::error!("Could not extract transactions from the statement: {error}");
            return error.into_alert_response();
        }
        Err(error) => {
            tracing::error!("The import task did not complete: {error}");
            return Error::ImportTaskFailed(error.to_string()).into_alert_response();
        }
    };

    if parsed_transactions.is_empty() {
        return (
            StatusCode::OK,
            Alert::Warning {
                message: "AI found no transactions – wrong file?".to_owned(),
                details: "Check that the file is a bank statement and that the model is running."
                    .to_owned(),
            }
            .into_html(),
        )
            .into_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let imported_count = match store_transactions(&parsed_transactions, &connection) {
        Ok(imported_count) => imported_count,
        Err(error) => {
            tracing::error!("Failed to import transactions: {error}");
            return error.into_alert_response();
        }
    };

    let duration = start_time.elapsed();
    tracing::info!(
        "Imported {imported_count} of {} transactions in {:.1}s",
        parsed_transactions.len(),
        duration.as_secs_f64()
    );

    (
        StatusCode::CREATED,
        Alert::Success {
            message: format!("Imported {imported_count} transactions"),
            details: format!("The statement was processed in {:.1}s.", duration.as_secs_f64()),
        }
        .into_html(),
    )
        .into_response()
}

/// Read the statement from the multipart form, returning its extension and contents.
///
/// Fields other than `file` are ignored.
async fn read_statement_upload(mut multipart: Multipart) -> Result<(String, Bytes), Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_owned();
        let extension = allowed_extension(&file_name)?;

        let contents = field.bytes().await.map_err(|error| {
            tracing::error!("Could not read data from multipart form field: {error}");
            Error::MultipartError(error.body_text())
        })?;

        return Ok((extension, contents));
    }

    Err(Error::NoFileSelected)
}

/// Store the transactions in a single database transaction, skipping any that fail.
///
/// Returns how many transactions were stored.
fn store_transactions(
    parsed_transactions: &[ParsedTransaction],
    connection: &Connection,
) -> Result<usize, Error> {
    let tx = connection.unchecked_transaction()?;
    let mut imported_count = 0;

    for parsed in parsed_transactions {
        let builder = Transaction::build(
            parsed.amount,
            parsed.date,
            &parsed.description,
            parsed.category,
        )
        .source(AI_PARSED_SOURCE);

        match create_transaction(builder, &tx) {
            Ok(_) => imported_count += 1,
            Err(error) => tracing::warn!("Skipping imported transaction {parsed:?}: {error}"),
        }
    }

    tx.commit()?;

    Ok(imported_count)
}
