//! The new goal page and the endpoint for creating goals.

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
    Error,
    database_id::RuleId,
    endpoints,
    goal::{
        db::create_goal,
        models::{Goal, GoalState, GoalType},
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    rule::{FixedRule, get_rules},
    user::UserId,
};

/// The form data for creating a goal.
#[derive(Debug, Deserialize)]
pub struct GoalForm {
    /// The goal's name.
    pub name: String,
    /// Whether the goal saves money up or pays a debt down.
    pub goal_type: GoalType,
    /// The amount to reach.
    pub target_amount: f64,
    /// The expected size of one installment, for payoff goals.
    #[serde(default)]
    pub installment_amount: Option<f64>,
    /// The total number of installments, for payoff goals.
    #[serde(default)]
    pub total_installments: Option<i64>,
    /// The fixed rule whose transactions should feed this goal.
    #[serde(default)]
    pub linked_rule_id: Option<RuleId>,
}

/// Route handler for the page with the new goal form.
pub async fn get_new_goal_page(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let rules = match get_rules(user_id, &connection) {
        Ok(rules) => rules,
        Err(error) => return error.into_response(),
    };

    new_goal_page(&rules).into_response()
}

/// A route handler for creating a new goal, redirects to the goals page on
/// success.
pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<GoalForm>,
) -> Response {
    if !form.target_amount.is_finite() || form.target_amount <= 0.0 {
        return Error::InvalidAmount(form.target_amount).into_alert_response();
    }

    let installment_amount = form.installment_amount.unwrap_or(0.0);

    // A payoff goal with an installment amount but no installment count gets
    // its count derived from the target.
    let total_installments = match form.total_installments {
        Some(total_installments) => total_installments,
        None if form.goal_type == GoalType::Payoff && installment_amount > 0.0 => {
            (form.target_amount / installment_amount).ceil() as i64
        }
        None => 0,
    };

    let builder = Goal::build(user_id, form.name.trim(), form.goal_type)
        .target_amount(form.target_amount)
        .installment_amount(installment_amount)
        .total_installments(total_installments)
        .linked_rule_id(form.linked_rule_id);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_goal(builder, &connection) {
        tracing::error!("could not create goal: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::GOALS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn new_goal_page(rules: &[FixedRule]) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::GOALS_VIEW).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-6 text-2xl font-semibold" { "Nova Meta" }

            form
                hx-post=(endpoints::POST_GOAL)
                hx-target-4xx="#alert-container"
                hx-target-5xx="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Nome" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="goal_type" class=(FORM_LABEL_STYLE) { "Tipo" }

                    select id="goal_type" name="goal_type" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for goal_type in [GoalType::Accumulate, GoalType::Payoff] {
                            option value=(goal_type.as_str()) { (goal_type.label()) }
                        }
                    }
                }

                div
                {
                    label for="target_amount" class=(FORM_LABEL_STYLE) { "Valor alvo (R$)" }

                    input
                        id="target_amount"
                        type="number"
                        name="target_amount"
                        step="0.01"
                        min="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="installment_amount" class=(FORM_LABEL_STYLE)
                    {
                        "Valor da parcela (R$, opcional)"
                    }

                    input
                        id="installment_amount"
                        type="number"
                        name="installment_amount"
                        step="0.01"
                        min="0"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="total_installments" class=(FORM_LABEL_STYLE)
                    {
                        "Número de parcelas (opcional)"
                    }

                    input
                        id="total_installments"
                        type="number"
                        name="total_installments"
                        step="1"
                        min="0"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="linked_rule_id" class=(FORM_LABEL_STYLE)
                    {
                        "Lançamento fixo vinculado (opcional)"
                    }

                    select
                        id="linked_rule_id"
                        name="linked_rule_id"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "Nenhum" }

                        @for rule in rules {
                            option value=(rule.id) { (rule.description) }
                        }
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Salvar" }
            }
        }
    };

    base("Nova Meta", &content)
}
