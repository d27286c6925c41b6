//! Sums the stored transactions into the figures shown on the dashboard.

use rusqlite::Connection;
use time::Date;

use crate::{Error, transaction::Category};

/// The share of income owed as maaser.
pub const MAASER_RATE: f64 = 0.1;

/// How much maaser is owed for a fiscal period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaaserSummary {
    /// Income received since the start of the period.
    pub income: f64,
    /// Maaser given over all time, as a positive number.
    pub maaser_given: f64,
    /// Maaser still to give. Negative if more has been given than is due.
    pub owed: f64,
}

impl MaaserSummary {
    /// Work out the maaser owed from the period income and the maaser given.
    pub fn new(income: f64, maaser_given: f64) -> Self {
        Self {
            income,
            maaser_given,
            owed: income * MAASER_RATE - maaser_given,
        }
    }
}

/// Sum the positive income received on or after `start`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn income_since(start: Date, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_one(
            "SELECT COALESCE(SUM(amount), 0.0) FROM \"transaction\"
             WHERE category = ?1 AND amount > 0 AND date >= ?2",
            (Category::Income, start),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Sum all the maaser ever given, as a positive number.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn total_maaser_given(connection: &Connection) -> Result<f64, Error> {
    let total: f64 = connection.query_one(
        "SELECT COALESCE(SUM(amount), 0.0) FROM \"transaction\" WHERE category = ?1",
        (Category::MaaserGiven,),
        |row| row.get(0),
    )?;

    Ok(total.abs())
}

/// Work out the maaser owed for the period starting on `start`.
pub fn summarize(start: Date, connection: &Connection) -> Result<MaaserSummary, Error> {
    let income = income_since(start, connection)?;
    let maaser_given = total_maaser_given(connection)?;

    Ok(MaaserSummary::new(income, maaser_given))
}
