//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{DatabaseId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// The maximum number of characters stored for a transaction description.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// The smallest absolute amount that may be stored.
pub const MIN_AMOUNT: f64 = 0.01;

/// The source recorded for transactions entered by hand.
pub const MANUAL_SOURCE: &str = "Manual";

/// What a transaction means for the maaser calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Money received. Ten percent of it is owed as maaser.
    Income,
    /// Money spent, ignored by the maaser calculation.
    Expense,
    /// Maaser that has been paid, deducted from the amount owed.
    MaaserGiven,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 3] = [Category::Income, Category::Expense, Category::MaaserGiven];

    /// The string stored in the database and used in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Expense => "expense",
            Category::MaaserGiven => "maaser_given",
        }
    }

    /// The human readable name of the category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Income => "Income",
            Category::Expense => "Expense",
            Category::MaaserGiven => "Maaser Given",
        }
    }

    /// Give `amount` the sign that matches the category.
    ///
    /// Income is positive, expenses and maaser given are negative.
    pub fn signed_amount(&self, amount: f64) -> f64 {
        match self {
            Category::Income => amount.abs(),
            Category::Expense | Category::MaaserGiven => -amount.abs(),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Category::Income),
            "expense" => Ok(Category::Expense),
            "maaser_given" => Ok(Category::MaaserGiven),
            other => Err(Error::InvalidCategory(other.to_owned())),
        }
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// A single movement of money, either entered by hand or imported from a
/// bank statement.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// When the transaction happened.
    pub date: Date,
    /// The amount of money received (positive) or spent (negative).
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// How the transaction counts towards maaser.
    pub category: Category,
    /// Where the transaction came from, e.g. "Manual" or "AI Parsed".
    pub source: String,
    /// A free text annotation from the user.
    pub note: String,
    /// When the transaction was added to the database.
    pub imported_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: f64,
        date: Date,
        description: &str,
        category: Category,
    ) -> TransactionBuilder {
        TransactionBuilder {
            date,
            amount,
            description: description.to_owned(),
            category,
            source: MANUAL_SOURCE.to_owned(),
            note: String::new(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::transaction::{Category, Transaction};
///
/// let transaction = Transaction::build(
///         -250.0,
///         date!(2025-01-15),
///         "Don Maaser",
///         Category::MaaserGiven,
///     )
///     .source("AI Parsed");
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The date when the transaction occurred.
    pub date: Date,

    /// The monetary amount of the transaction.
    ///
    /// Positive values represent money received, negative values represent
    /// money spent or maaser given. The amount must be at least 0.01 in
    /// absolute value.
    pub amount: f64,

    /// A human-readable description of the transaction.
    ///
    /// Descriptions longer than [MAX_DESCRIPTION_LENGTH] characters are truncated
    /// when the transaction is stored.
    pub description: String,

    /// How the transaction counts towards maaser.
    pub category: Category,

    /// Where the transaction came from. Defaults to [MANUAL_SOURCE].
    pub source: String,

    /// A free text annotation. Defaults to an empty string.
    pub note: String,
}

impl TransactionBuilder {
    /// Set where the transaction came from.
    pub fn source(mut self, source: &str) -> Self {
        source.clone_into(&mut self.source);
        self
    }

    /// Set the note for the transaction.
    pub fn note(mut self, note: &str) -> Self {
        note.clone_into(&mut self.note);
        self
    }
}

/// Round `amount` to whole cents.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Truncate `description` to at most [MAX_DESCRIPTION_LENGTH] characters.
pub fn truncate_description(description: &str) -> String {
    description.chars().take(MAX_DESCRIPTION_LENGTH).collect()
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, date, amount, description, category, source, note, imported_at";

/// Create a new transaction in the database from a builder.
///
/// The amount is stored rounded to cents.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not finite or smaller than 0.01 in absolute value,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !builder.amount.is_finite() || builder.amount.abs() < MIN_AMOUNT {
        return Err(Error::InvalidAmount(builder.amount));
    }

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (date, amount, description, category, source, note, imported_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.date,
                round_to_cents(builder.amount),
                truncate_description(&builder.description),
                builder.category,
                builder.source,
                builder.note,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all transactions, the most recent first.
///
/// Transactions on the same date are ordered by descending ID.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn list_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" ORDER BY date DESC, id DESC"
        ))?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL CHECK (category IN ('income', 'expense', 'maaser_given')),
                source TEXT NOT NULL DEFAULT 'Manual',
                note TEXT NOT NULL DEFAULT '',
                imported_at TEXT NOT NULL
                )",
        (),
    )?;

    // The dashboard filters income by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        source: row.get(5)?,
        note: row.get(6)?,
        imported_at: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        transaction::{
            Category, Transaction, count_transactions, create_transaction, get_transaction,
            list_transactions,
        },
    };

    use super::MAX_DESCRIPTION_LENGTH;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = 12.3;

        let result = create_transaction(
            Transaction::build(amount, date!(2025 - 10 - 05), "", Category::Income),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.source, "Manual");
                assert_eq!(transaction.note, "");
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_tiny_amount() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(0.001, date!(2025 - 10 - 05), "", Category::Income),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidAmount(0.001)));
        assert_eq!(count_transactions(&conn), Ok(0));
    }

    #[test]
    fn create_truncates_long_description() {
        let conn = get_test_connection();
        let description = "é".repeat(MAX_DESCRIPTION_LENGTH + 20);

        let transaction = create_transaction(
            Transaction::build(-5.0, date!(2025 - 10 - 05), &description, Category::Expense),
            &conn,
        )
        .unwrap();

        assert_eq!(
            transaction.description.chars().count(),
            MAX_DESCRIPTION_LENGTH
        );
    }

    #[test]
    fn get_round_trips_all_fields() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(-250.0, date!(2024 - 03 - 01), "Don", Category::MaaserGiven)
                .source("AI Parsed")
                .note("Pesach"),
            &conn,
        )
        .unwrap();

        let got = get_transaction(created.id, &conn).unwrap();

        assert_eq!(got, created);
    }

    #[test]
    fn get_missing_transaction_is_not_found() {
        let conn = get_test_connection();

        assert_eq!(get_transaction(42, &conn), Err(Error::NotFound));
    }

    #[test]
    fn list_orders_by_date_then_id_descending() {
        let conn = get_test_connection();
        let first = create_transaction(
            Transaction::build(1.0, date!(2025 - 01 - 02), "", Category::Income),
            &conn,
        )
        .unwrap();
        let second = create_transaction(
            Transaction::build(2.0, date!(2025 - 03 - 04), "", Category::Income),
            &conn,
        )
        .unwrap();
        let third = create_transaction(
            Transaction::build(3.0, date!(2025 - 01 - 02), "", Category::Income),
            &conn,
        )
        .unwrap();

        let ids: Vec<_> = list_transactions(&conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();

        assert_eq!(ids, vec![second.id, third.id, first.id]);
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                Transaction::build(i as f64, today, "", Category::Income),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}
