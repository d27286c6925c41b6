//! The page for changing the category and note of a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        format_currency, loading_spinner,
    },
    navigation::NavBar,
    transaction::{Category, Transaction, get_transaction},
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The database connection for accessing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a transaction.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let transaction = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transaction(transaction_id, &connection)?
    };

    Ok(edit_transaction_view(&transaction).into_response())
}

fn edit_transaction_view(transaction: &Transaction) -> Markup {
    let update_route = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_route)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

                dl class="grid grid-cols-2 gap-2 text-sm"
                {
                    dt class="font-medium" { "Date" }
                    dd { (transaction.date) }
                    dt class="font-medium" { "Amount" }
                    dd { (format_currency(transaction.amount)) }
                    dt class="font-medium" { "Description" }
                    dd class="break-words" { (transaction.description) }
                    dt class="font-medium" { "Source" }
                    dd { (transaction.source) }
                }

                div
                {
                    label
                        for="category"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Category"
                    }

                    select
                        name="category"
                        id="category"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for category in Category::ALL {
                            option
                                value=(category.as_str())
                                selected[category == transaction.category]
                            {
                                (category.label())
                            }
                        }
                    }
                }

                div
                {
                    label
                        for="note"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Note"
                    }

                    input
                        name="note"
                        id="note"
                        type="text"
                        value=(transaction.note)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Save Transaction"
                }
            }
        }
    };

    base("Edit Transaction", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_submit_button_with_text, assert_hx_endpoint, assert_status_ok,
            assert_valid_html, must_get_form, parse_html_document,
        },
        transaction::{Category, Transaction, create_transaction},
    };

    use super::{EditTransactionPageState, get_edit_transaction_page};

    fn get_test_state() -> EditTransactionPageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        EditTransactionPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn renders_form_with_current_values() {
        let state = get_test_state();
        let transaction = create_transaction(
            Transaction::build(-36.0, date!(2025 - 02 - 03), "Tzedaka box", Category::Expense)
                .note("check"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_edit_transaction_page(State(state), Path(transaction.id))
            .await
            .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::TRANSACTION, transaction.id),
            "hx-put",
        );
        assert_form_submit_button_with_text(&form, "Save Transaction");

        let selected = document
            .select(&Selector::parse("select[name=category] option[selected]").unwrap())
            .next()
            .expect("No selected category");
        assert_eq!(selected.value().attr("value"), Some("expense"));

        let note = document
            .select(&Selector::parse("input[name=note]").unwrap())
            .next()
            .expect("No note input");
        assert_eq!(note.value().attr("value"), Some("check"));
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let state = get_test_state();

        let result = get_edit_transaction_page(State(state), Path(99)).await;

        let error = result.expect_err("want not found error");
        assert_eq!(error, Error::NotFound);
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }
}
