//! The page listing every transaction with controls for editing and deleting them.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::Uri,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    transaction::{Transaction, list_transactions},
};

/// The max number of graphemes to display in the transaction table rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 48;

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render an overview of the user's transactions.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
) -> Result<Response, Error> {
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        list_transactions(&connection)
            .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?
    };

    Ok(transactions_view(&transactions).into_response())
}

fn amount_class(amount: f64) -> &'static str {
    if amount < 0.0 {
        "text-red-700 dark:text-red-300"
    } else {
        "text-green-700 dark:text-green-300"
    }
}

fn transactions_view(transactions: &[Transaction]) -> Markup {
    let create_transaction_route = Uri::from_static(endpoints::NEW_TRANSACTION_VIEW);
    let import_transaction_route = Uri::from_static(endpoints::IMPORT_VIEW);
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="relative w-full max-w-screen-xl"
            {
                div class="flex justify-between flex-wrap items-end gap-4 mb-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    div class="flex gap-4"
                    {
                        a href=(create_transaction_route) class=(LINK_STYLE) { "Create Transaction" }
                        a href=(import_transaction_route) class=(LINK_STYLE) { "Import Transactions" }
                    }
                }

                @if transactions.is_empty() {
                    p class="py-8 text-center text-gray-500 dark:text-gray-400" data-empty-state="true"
                    {
                        "No transactions yet. Create one by hand or import a bank statement."
                    }
                } @else {
                    form
                        id="bulk-delete-form"
                        hx-post=(endpoints::BULK_DELETE_TRANSACTIONS)
                        hx-target-error="#alert-container"
                        hx-swap="none"
                        hx-confirm="Delete the selected transactions? This cannot be undone."
                    {
                        div class="overflow-x-auto rounded shadow-md"
                        {
                            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                            {
                                thead class=(TABLE_HEADER_STYLE)
                                {
                                    tr
                                    {
                                        th scope="col" class="px-6 py-3" { span class="sr-only" { "Select" } }
                                        th scope="col" class="px-6 py-3" { "Date" }
                                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                        th scope="col" class="px-6 py-3" { "Description" }
                                        th scope="col" class="px-6 py-3" { "Category" }
                                        th scope="col" class="px-6 py-3" { "Source" }
                                        th scope="col" class="px-6 py-3" { "Note" }
                                        th scope="col" class="px-6 py-3" { "Actions" }
                                    }
                                }

                                tbody
                                {
                                    @for transaction in transactions {
                                        (transaction_row_view(transaction))
                                    }
                                }
                            }
                        }

                        button
                            type="submit"
                            class="mt-4 px-4 py-2 bg-red-600 hover:bg-red-700 text-white rounded"
                        {
                            "Delete Selected"
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

fn transaction_row_view(transaction: &Transaction) -> Markup {
    let amount_str = format_currency(transaction.amount);
    let amount_class = amount_class(transaction.amount);
    let (description, tooltip) = format_description(&transaction.description);
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                input
                    type="checkbox"
                    name="selected_ids"
                    value=(transaction.id)
                    aria-label="Select transaction";
            }
            td class=(TABLE_CELL_STYLE) { time datetime=(transaction.date) { (transaction.date) } }
            td class={ "px-6 py-4 text-right " (amount_class) } { (amount_str) }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (description) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (transaction.category.label()) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.source) }
            td class=(TABLE_CELL_STYLE) { (transaction.note) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm=(confirm_message)
                        hx-target="closest tr"
                        hx-target-error="#alert-container"
                        hx-swap="delete"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();
        let truncated = truncated + "...";
        (truncated, Some(description))
    }
}
