//! The new fixed rule page and the endpoint for creating rules.

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

use crate::{
    Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    rule::{
        db::create_rule,
        models::{FixedRule, RuleState},
    },
    transaction::{Classification, TransactionKind},
    user::UserId,
};

/// The form data for creating or updating a fixed rule.
#[derive(Debug, Deserialize)]
pub struct RuleForm {
    /// Whether the generated transactions are income or expenses.
    pub kind: TransactionKind,
    /// The description generated transactions carry.
    pub description: String,
    /// The magnitude of the recurring amount in reais. Must be positive.
    pub amount: f64,
    /// The day of the month the entry is due, between 1 and 31.
    pub day_of_month: i64,
    /// The budget category.
    pub category: String,
    /// The budget bucket.
    pub classification: Classification,
}

/// Route handler for the page with the new fixed rule form.
pub async fn get_new_rule_page() -> Response {
    rule_form_page(
        "Novo Lançamento Fixo",
        "post",
        endpoints::POST_RULE,
        &RuleFormValues::default(),
    )
    .into_response()
}

/// A route handler for creating a new fixed rule, redirects to the rules
/// page on success.
pub async fn create_rule_endpoint(
    State(state): State<RuleState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<RuleForm>,
) -> Response {
    if !form.amount.is_finite() || form.amount <= 0.0 {
        return Error::InvalidAmount(form.amount).into_alert_response();
    }

    if !(1..=31).contains(&form.day_of_month) {
        return Error::InvalidDayOfMonth(form.day_of_month).into_alert_response();
    }

    let builder = FixedRule::build(
        user_id,
        form.kind,
        form.amount,
        form.description.trim(),
        form.day_of_month as u8,
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

    if let Err(error) = create_rule(builder, &connection) {
        tracing::error!("could not create fixed rule: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::RULES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// The values used to pre-fill the fixed rule form.
pub(super) struct RuleFormValues<'a> {
    pub kind: TransactionKind,
    pub description: &'a str,
    pub amount: Option<f64>,
    pub day_of_month: u8,
    pub category: &'a str,
    pub classification: Classification,
}

impl Default for RuleFormValues<'_> {
    fn default() -> Self {
        Self {
            kind: TransactionKind::Expense,
            description: "",
            amount: None,
            day_of_month: 1,
            category: "",
            classification: Classification::Essential,
        }
    }
}

/// Render the create/edit fixed rule form page.
///
/// `method` is the htmx verb attribute to use, either "post" or "put".
pub(super) fn rule_form_page(
    title: &str,
    method: &str,
    action: &str,
    values: &RuleFormValues,
) -> Markup {
    let amount_value = values
        .amount
        .map(|amount| format!("{amount:.2}"))
        .unwrap_or_default();
    let post_action = (method == "post").then_some(action);
    let put_action = (method == "put").then_some(action);

    let content = html! {
        (NavBar::new(endpoints::RULES_VIEW).into_html())

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
                    label for="description" class=(FORM_LABEL_STYLE) { "Descrição" }

                    input
                        id="description"
                        type="text"
                        name="description"
                        value=(values.description)
                        required
                        autofocus
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
                    label for="day_of_month" class=(FORM_LABEL_STYLE) { "Dia do mês" }

                    input
                        id="day_of_month"
                        type="number"
                        name="day_of_month"
                        value=(values.day_of_month)
                        step="1"
                        min="1"
                        max="31"
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
