use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner},
    import::ALLOWED_EXTENSIONS,
    navigation::NavBar,
};

fn accepted_file_types() -> String {
    ALLOWED_EXTENSIONS
        .iter()
        .map(|extension| format!(".{extension}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn import_form_view() -> Markup {
    let import_route = endpoints::IMPORT;
    let spinner = loading_spinner();
    let accept = accepted_file_types();

    html! {
        form
            hx-post=(import_route)
            enctype="multipart/form-data"
            hx-disabled-elt="#file, #submit-button"
            hx-indicator="#indicator"
            hx-swap="none"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="file"
                    class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Choose a bank statement"
                }

                input
                    id="file"
                    type="file"
                    name="file"
                    accept=(accept)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                p class="mt-2 text-sm text-gray-500 dark:text-gray-400"
                {
                    "Upload a CSV, PDF or Excel export of your bank statement. "
                    "The transactions are read by a local AI model, which can take a minute or two."
                }
            }

            button
                type="submit"
                id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Import Statement"
            }
        }
    }
}

fn import_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::IMPORT_VIEW).into_html();
    let form = import_form_view();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="relative"
            {
                (form)
            }
        }
    };

    base("Import Statement", &[], &content)
}

/// Route handler for the statement upload page.
pub async fn get_import_page() -> Response {
    import_view().into_response()
}
