//! Defines the page and endpoint for creating a new transaction.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    month::MonthKey,
    navigation::NavBar,
    transaction::{
        Classification, Transaction, TransactionKind, TransactionState, core::create_transaction,
    },
    user::UserId,
};

/// The form data for creating or updating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The date when the transaction occurred or is due.
    pub date: Date,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// The magnitude of the transaction in reais. Must be positive, the sign
    /// is derived from `kind`.
    pub amount: f64,
    /// Text detailing the transaction.
    pub description: String,
    /// The budget category.
    pub category: String,
    /// The budget bucket.
    pub classification: Classification,
}

/// Route handler for the page with the new transaction form.
pub async fn get_new_transaction_page() -> Response {
    let today = OffsetDateTime::now_utc().date();

    transaction_form_page(
        "Novo Lançamento",
        "post",
        endpoints::TRANSACTIONS_API,
        &FormValues {
            date: today,
            kind: TransactionKind::Expense,
            amount: None,
            description: "",
            category: "",
            classification: Classification::Essential,
        },
    )
    .into_response()
}

/// A route handler for creating a new transaction.
///
/// Redirects to the dashboard for the transaction's month on success.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    if !form.amount.is_finite() || form.amount <= 0.0 {
        return Error::InvalidAmount(form.amount).into_alert_response();
    }

    let builder = Transaction::build(
        user_id,
        form.kind,
        form.amount,
        form.date,
        form.description.trim(),
    )
    .category(form.category.trim())
    .classification(form.classification);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_transaction(builder, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    let month = MonthKey::from_date(form.date);

    (
        HxRedirect(format!("{}?month={month}", endpoints::DASHBOARD_VIEW)),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// The values used to pre-fill the transaction form.
pub(super) struct FormValues<'a> {
    pub date: Date,
    pub kind: TransactionKind,
    pub amount: Option<f64>,
    pub description: &'a str,
    pub category: &'a str,
    pub classification: Classification,
}

/// Render the create/edit transaction form page.
///
/// `method` is the htmx verb attribute to use, either "post" or "put".
pub(super) fn transaction_form_page(
    title: &str,
    method: &str,
    action: &str,
    values: &FormValues,
) -> Markup {
    let date_value = format!(
        "{:04}-{:02}-{:02}",
        values.date.year(),
        values.date.month() as u8,
        values.date.day()
    );
    let amount_value = values
        .amount
        .map(|amount| format!("{:.2}", amount.abs()))
        .unwrap_or_default();
    let post_action = (method == "post").then_some(action);
    let put_action = (method == "put").then_some(action);

    let content = html! {
        (NavBar::new("").into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-6 text-2xl font-semibold" { (title) }

            form
                hx-post=[post_action]
                hx-put=[put_action]
                hx-target-4xx="#alert-container"
                hx-target-5xx="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Data" }

                    input
                        id="date"
                        type="date"
                        name="date"
                        value=(date_value)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="kind" class=(FORM_LABEL_STYLE) { "Tipo" }

                    select id="kind" name="kind" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for kind in [TransactionKind::Income, TransactionKind::Expense] {
                            option
                                value=(kind.as_str())
                                selected[values.kind == kind]
                            {
                                (kind.label())
                            }
                        }
                    }
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Valor (R$)" }

                    input
                        id="amount"
                        type="number"
                        name="amount"
                        value=(amount_value)
                        step="0.01"
                        min="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Descrição" }

                    input
                        id="description"
                        type="text"
                        name="description"
                        value=(values.description)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Categoria" }

                    input
                        id="category"
                        type="text"
                        name="category"
                        value=(values.category)
                        placeholder="Outros"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="classification" class=(FORM_LABEL_STYLE) { "Classificação" }

                    select
                        id="classification"
                        name="classification"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for classification in Classification::ALL {
                            option
                                value=(classification.as_str())
                                selected[values.classification == classification]
                            {
                                (classification.label())
                            }
                        }
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Salvar" }
            }
        }
    };

    base(title, &content)
}
