//! Success and error flash messages swapped into the page via htmx
//! out-of-band swaps.
//!
//! Every page rendered by [crate::html::base] carries an empty
//! `#alert-container` element; endpoints return an [Alert] whose markup
//! targets that container with `hx-swap-oob`.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

const SUCCESS_STYLE: &str = "flex items-start gap-3 p-4 mb-4 rounded border \
    border-green-300 bg-green-50 text-green-800 dark:bg-gray-800 \
    dark:text-green-400 dark:border-green-800";

const ERROR_STYLE: &str = "flex items-start gap-3 p-4 mb-4 rounded border \
    border-red-300 bg-red-50 text-red-800 dark:bg-gray-800 \
    dark:text-red-400 dark:border-red-800";

/// A flash message shown to the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action succeeded; `details` elaborates on the outcome.
    Success {
        /// Short headline, e.g. "3 lançamentos fixos gerados."
        message: String,
        /// Supporting detail shown under the headline.
        details: String,
    },
    /// The action succeeded and needs no elaboration.
    SuccessSimple {
        /// Short headline.
        message: String,
    },
    /// The action failed.
    Error {
        /// Short headline.
        message: String,
        /// Supporting detail shown under the headline.
        details: String,
    },
}

impl Alert {
    /// Create a success alert with details.
    pub fn success(message: &str, details: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Create a success alert without details.
    pub fn success_simple(message: &str) -> Self {
        Self::SuccessSimple {
            message: message.to_owned(),
        }
    }

    /// Create an error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Render the alert as an out-of-band swap for `#alert-container`.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html! {
            div id="alert-container" hx-swap-oob="true" class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div role="alert" class=(style)
                {
                    div
                    {
                        p class="font-medium" { (message) }

                        @if !details.is_empty() {
                            p class="mt-1 text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ml-auto text-sm opacity-70 hover:opacity-100"
                        onclick="this.closest('#alert-container').innerHTML = ''"
                    {
                        "✕"
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
