//! Database schema creation and versioning.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, transaction::create_transaction_table};

/// The version of the database schema created by [initialize].
///
/// Stored in SQLite's `user_version` pragma so that a database created by an
/// older build can be detected.
pub const SCHEMA_VERSION: i64 = 1;

/// Create the tables for the domain models if they do not exist yet.
///
/// Calling this function on a database that has already been initialized is a no-op.
///
/// # Errors
/// Returns an error if there is an SQL error, or [Error::SchemaVersionMismatch]
/// if the database was created with a newer, incompatible schema.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let version = schema_version(&transaction)?;

    if version > SCHEMA_VERSION {
        tracing::error!(
            "database schema version {version} is newer than the supported version {SCHEMA_VERSION}"
        );
        return Err(Error::SchemaVersionMismatch(version));
    }

    create_transaction_table(&transaction)?;

    if version < SCHEMA_VERSION {
        tracing::info!("Upgraded database schema from version {version} to {SCHEMA_VERSION}");
        transaction.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }

    transaction.commit()?;

    Ok(())
}

/// Read the schema version recorded in the database.
pub fn schema_version(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::Error;

    use super::{SCHEMA_VERSION, initialize, schema_version};

    #[test]
    fn initialize_records_schema_version() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();
        let result = initialize(&conn);

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn initialize_rejects_newer_schema() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();

        let result = initialize(&conn);

        assert_eq!(result, Err(Error::SchemaVersionMismatch(SCHEMA_VERSION + 1)));
    }
}
