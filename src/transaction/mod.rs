//! Transaction management for the maaser tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its `Category` and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - View handlers for transaction-related web pages

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod transactions_page;

pub use core::{
    Category, MAX_DESCRIPTION_LENGTH, MIN_AMOUNT, Transaction, TransactionBuilder,
    count_transactions, create_transaction, create_transaction_table, get_transaction,
    list_transactions, round_to_cents, truncate_description,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::{bulk_delete_transactions_endpoint, delete_transaction_endpoint};
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use transactions_page::get_transactions_page;
