//! The dashboard: one month of transactions with summary totals.
//!
//! Viewing a month also reconciles it, so fixed entries show up the first
//! time the user opens a new month.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_HEADER_STYLE,
        base, format_reais,
    },
    month::MonthKey,
    navigation::NavBar,
    rule::reconcile,
    transaction::{
        Classification, PaidStatus, Transaction, get_transactions_for_month,
        transaction_row_view,
    },
    user::UserId,
};

/// The state needed by the dashboard route handler.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and reconciling.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for the dashboard page.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// The month to show, e.g. "2024-03". Defaults to the current month.
    pub month: Option<String>,
}

/// Route handler for the dashboard page.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let month = match query.month {
        Some(raw_month) => match MonthKey::parse(&raw_month) {
            Ok(month) => month,
            Err(error) => return error.into_response(),
        },
        None => MonthKey::from_date(OffsetDateTime::now_utc().date()),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    // Opening a month reconciles it, so fixed entries appear without the
    // user having to ask.
    let sql_transaction = match connection.unchecked_transaction() {
        Ok(sql_transaction) => sql_transaction,
        Err(error) => return Error::from(error).into_response(),
    };

    let generated = match reconcile(user_id, month, false, &sql_transaction) {
        Ok(generated) => generated,
        Err(error) => {
            tracing::error!("could not reconcile {month}: {error}");

            return error.into_response();
        }
    };

    if let Err(error) = sql_transaction.commit() {
        tracing::error!("could not commit reconciliation: {error}");

        return Error::from(error).into_response();
    }

    if generated > 0 {
        tracing::info!("reconciling {month} generated {generated} transactions");
    }

    let transactions = match get_transactions_for_month(user_id, month, &connection) {
        Ok(transactions) => transactions,
        Err(error) => return error.into_response(),
    };

    dashboard_page(month, &transactions).into_response()
}

/// The monthly totals shown at the top of the dashboard.
#[derive(Debug, Default, PartialEq)]
struct MonthSummary {
    income: f64,
    expenses: f64,
    pending_expenses: f64,
    by_classification: [f64; 3],
}

impl MonthSummary {
    /// Tally the totals for one month of transactions.
    fn tally(transactions: &[Transaction]) -> Self {
        let mut summary = Self::default();

        for transaction in transactions {
            if transaction.amount >= 0.0 {
                summary.income += transaction.amount;
                continue;
            }

            let magnitude = -transaction.amount;
            summary.expenses += magnitude;

            if transaction.status == PaidStatus::Pending {
                summary.pending_expenses += magnitude;
            }

            let bucket = Classification::ALL
                .iter()
                .position(|classification| *classification == transaction.classification)
                .unwrap_or_default();
            summary.by_classification[bucket] += magnitude;
        }

        summary
    }

    fn balance(&self) -> f64 {
        self.income - self.expenses
    }
}

fn dashboard_page(month: MonthKey, transactions: &[Transaction]) -> Markup {
    let summary = MonthSummary::tally(transactions);
    let previous_url = format!("{}?month={}", endpoints::DASHBOARD_VIEW, month.previous());
    let next_url = format!("{}?month={}", endpoints::DASHBOARD_VIEW, month.next());

    let content = html! {
        (NavBar::new(endpoints::DASHBOARD_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="mb-4 flex items-center justify-between"
            {
                a href=(previous_url) class=(LINK_STYLE) { "← Anterior" }

                h1 class="text-2xl font-semibold" { (month.label()) }

                a href=(next_url) class=(LINK_STYLE) { "Próximo →" }
            }

            div class="mb-4 grid gap-4 md:grid-cols-3"
            {
                (summary_card("Entradas", summary.income, "text-green-600"))
                (summary_card("Saídas", summary.expenses, "text-red-600"))
                (summary_card("Saldo", summary.balance(), balance_style(summary.balance())))
            }

            @if summary.pending_expenses > 0.0 {
                p class="mb-4 text-sm text-gray-500 dark:text-gray-400"
                {
                    "Saídas pendentes: " (format_reais(summary.pending_expenses))
                }
            }

            div class="mb-6 grid gap-4 md:grid-cols-3"
            {
                @for (index, classification) in Classification::ALL.iter().enumerate() {
                    (summary_card(
                        classification.label(),
                        summary.by_classification[index],
                        "text-gray-700 dark:text-gray-300",
                    ))
                }
            }

            div class="mb-4 flex items-center justify-between"
            {
                a href=(endpoints::NEW_TRANSACTION_VIEW) class=(BUTTON_PRIMARY_STYLE)
                {
                    "Novo Lançamento"
                }

                form hx-post=(endpoints::GENERATE_FIXED)
                {
                    input type="hidden" name="month" value=(month.to_string());

                    button
                        type="submit"
                        class="rounded-lg border border-blue-600 px-4 py-2 text-sm \
                            text-blue-600 hover:bg-blue-50 dark:hover:bg-gray-800"
                    {
                        "Gerar Fixos"
                    }
                }
            }

            @if transactions.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "Nenhum lançamento neste mês." }
            } @else {
                table class="w-full text-left text-sm"
                {
                    thead
                    {
                        tr
                        {
                            th class=(TABLE_HEADER_STYLE) { "Data" }
                            th class=(TABLE_HEADER_STYLE) { "Descrição" }
                            th class=(TABLE_HEADER_STYLE) { "Categoria" }
                            th class=(TABLE_HEADER_STYLE) { "Classificação" }
                            th class=(TABLE_HEADER_STYLE) { "Valor" }
                            th class=(TABLE_HEADER_STYLE) { "Status" }
                            th class=(TABLE_HEADER_STYLE) {}
                            th class=(TABLE_HEADER_STYLE) {}
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
        }
    };

    base(&month.label(), &content)
}

fn summary_card(title: &str, amount: f64, amount_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (title) }

            p class={"text-xl font-semibold " (amount_style)} { (format_reais(amount)) }
        }
    }
}

fn balance_style(balance: f64) -> &'static str {
    if balance < 0.0 {
        "text-red-600"
    } else {
        "text-green-600"
    }
}
