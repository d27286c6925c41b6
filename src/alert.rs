//! Alert system for displaying success, warning and error messages to users.
//!
//! Alerts are swapped out-of-band into the `#alert-container` element that
//! every page created with [crate::html::base] contains.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A dismissable message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success { message: String, details: String },
    SuccessSimple { message: String },
    Warning { message: String, details: String },
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    fn style(&self) -> &'static str {
        match self {
            Alert::Success { .. } | Alert::SuccessSimple { .. } => {
                "flex items-start p-4 mb-4 rounded-lg text-green-800 bg-green-50 \
                dark:bg-gray-800 dark:text-green-400 shadow"
            }
            Alert::Warning { .. } => {
                "flex items-start p-4 mb-4 rounded-lg text-yellow-800 bg-yellow-50 \
                dark:bg-gray-800 dark:text-yellow-300 shadow"
            }
            Alert::Error { .. } | Alert::ErrorSimple { .. } => {
                "flex items-start p-4 mb-4 rounded-lg text-red-800 bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 shadow"
            }
        }
    }

    fn message(&self) -> &str {
        match self {
            Alert::Success { message, .. }
            | Alert::SuccessSimple { message }
            | Alert::Warning { message, .. }
            | Alert::Error { message, .. }
            | Alert::ErrorSimple { message } => message,
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            Alert::Success { details, .. }
            | Alert::Warning { details, .. }
            | Alert::Error { details, .. } => Some(details),
            Alert::SuccessSimple { .. } | Alert::ErrorSimple { .. } => None,
        }
    }

    /// Render the alert as an out-of-band swap for `#alert-container`.
    pub fn into_html(self) -> Markup {
        let style = self.style();
        let role = match &self {
            Alert::Error { .. } | Alert::ErrorSimple { .. } => "alert",
            _ => "status",
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(style) role=(role)
                {
                    div class="flex-1"
                    {
                        p class="text-sm font-medium" { (self.message()) }

                        @if let Some(details) = self.details() {
                            @if !details.is_empty() {
                                p class="mt-1 text-sm opacity-80" { (details) }
                            }
                        }
                    }

                    button
                        type="button"
                        class="ms-3 text-sm font-medium underline"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                    {
                        "Dismiss"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
