//! Validates and cleans the loosely-typed records returned by the model.
//!
//! Each record is normalized on its own. A record that cannot be normalized
//! is dropped without affecting the rest of the batch.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Value, json};
use time::{Date, Month};

use crate::{
    import::prompt::TITHE_KEYWORDS,
    transaction::{Category, MIN_AMOUNT, round_to_cents, truncate_description},
};

/// A transaction extracted from a bank statement, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTransaction {
    /// When the transaction happened.
    pub date: Date,
    /// Rounded to two decimal places and at least 0.01 in absolute value.
    pub amount: f64,
    /// At most [MAX_DESCRIPTION_LENGTH](crate::transaction::MAX_DESCRIPTION_LENGTH) characters.
    pub description: String,
    /// Either given by the model or inferred from the description and amount.
    pub category: Category,
}

impl ParsedTransaction {
    /// The record in the shape the model is asked to produce.
    pub fn to_json(&self) -> Value {
        json!({
            "date": self.date.to_string(),
            "amount": self.amount,
            "description": self.description,
            "category": self.category.as_str(),
        })
    }
}

/// Normalize every record, keeping only the ones that are valid.
pub fn normalize_records(records: &[Value]) -> Vec<ParsedTransaction> {
    let transactions: Vec<_> = records.iter().filter_map(normalize_record).collect();

    tracing::info!(
        "Normalized {} of {} records from the model",
        transactions.len(),
        records.len()
    );

    transactions
}

/// Normalize a single record, returning `None` if it has to be dropped.
pub fn normalize_record(record: &Value) -> Option<ParsedTransaction> {
    let Some(date) = record.get("date").and_then(Value::as_str).and_then(normalize_date) else {
        tracing::debug!("Dropping record with an invalid date: {record}");
        return None;
    };

    let Some(amount) = record.get("amount").and_then(normalize_amount) else {
        tracing::debug!("Dropping record with an invalid amount: {record}");
        return None;
    };

    let description = match record.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(description)) => truncate_description(description),
        Some(other) => truncate_description(&other.to_string()),
    };

    let category = record
        .get("category")
        .and_then(Value::as_str)
        .and_then(|category| category.parse().ok())
        .unwrap_or_else(|| infer_category(&description, amount));

    Some(ParsedTransaction {
        date,
        amount,
        description,
        category,
    })
}

fn day_first_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").expect("day first date pattern is valid")
    })
}

fn iso_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("ISO date pattern is valid")
    })
}

/// Parse a `DD/MM/YYYY` or `YYYY-MM-DD` date, ignoring surrounding whitespace.
///
/// Returns `None` for any other format or for a day that does not exist,
/// e.g. 31/02/2024.
pub fn normalize_date(text: &str) -> Option<Date> {
    let text = text.trim();

    let (year, month, day) = if let Some(captures) = day_first_date_pattern().captures(text) {
        (
            captures[3].parse::<i32>().ok()?,
            captures[2].parse::<u8>().ok()?,
            captures[1].parse::<u8>().ok()?,
        )
    } else if let Some(captures) = iso_date_pattern().captures(text) {
        (
            captures[1].parse::<i32>().ok()?,
            captures[2].parse::<u8>().ok()?,
            captures[3].parse::<u8>().ok()?,
        )
    } else {
        return None;
    };

    Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

/// Read an amount from a JSON number or numeric string and round it to cents.
///
/// Returns `None` for anything that is not a finite number of at least 0.01
/// in absolute value.
pub fn normalize_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !amount.is_finite() || amount.abs() < MIN_AMOUNT {
        return None;
    }

    Some(round_to_cents(amount))
}

/// Guess the category of a record the model did not categorize.
pub fn infer_category(description: &str, amount: f64) -> Category {
    let description = description.to_lowercase();

    if TITHE_KEYWORDS
        .iter()
        .any(|keyword| description.contains(keyword))
    {
        Category::MaaserGiven
    } else if amount > 0.0 {
        Category::Income
    } else {
        Category::Expense
    }
}
