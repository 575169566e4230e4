//! Transactions: the income and expense entries shown on the dashboard.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState,
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_ROW_STYLE, format_reais},
};

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod toggle_endpoint;

pub use core::{
    Classification, PaidStatus, Transaction, TransactionKind, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, get_transactions_for_month,
};
pub use create_endpoint::{create_transaction_endpoint, get_new_transaction_page};
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::{get_edit_transaction_page, update_transaction_endpoint};
pub use toggle_endpoint::toggle_transaction_endpoint;

/// The state needed by the transaction route handlers.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render one transaction as a table row for the dashboard.
///
/// The toggle endpoint returns this same markup so that htmx can swap the row
/// in place.
pub(crate) fn transaction_row_view(transaction: &Transaction) -> Markup {
    let amount_style = if transaction.amount < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    };

    let status_style = match transaction.status {
        PaidStatus::Paid => {
            "rounded-full px-2 py-1 text-xs font-medium cursor-pointer \
             bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-300"
        }
        PaidStatus::Pending => {
            "rounded-full px-2 py-1 text-xs font-medium cursor-pointer \
             bg-yellow-100 text-yellow-800 dark:bg-yellow-900 dark:text-yellow-300"
        }
    };

    let toggle_route = format_endpoint(endpoints::TOGGLE_TRANSACTION, transaction.id);
    let edit_route = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_route = format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                (format!("{:02}/{:02}", transaction.date.day(), transaction.date.month() as u8))
            }

            td class=(TABLE_CELL_STYLE)
            {
                (transaction.description)

                @if transaction.is_recurring {
                    span
                        class="ml-2 rounded bg-blue-100 px-1.5 py-0.5 text-xs \
                            text-blue-800 dark:bg-blue-900 dark:text-blue-300"
                    {
                        "Fixo"
                    }
                }
            }

            td class=(TABLE_CELL_STYLE) { (transaction.category) }

            td class=(TABLE_CELL_STYLE) { (transaction.classification.label()) }

            td class={(TABLE_CELL_STYLE) " " (amount_style)}
            {
                (format_reais(transaction.amount))
            }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    hx-post=(toggle_route)
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                    class=(status_style)
                {
                    (transaction.status.label())
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                a href=(edit_route) class=(LINK_STYLE) { "Editar" }
            }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    hx-delete=(delete_route)
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                    hx-confirm="Excluir este lançamento?"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Excluir"
                }
            }
        }
    }
}
