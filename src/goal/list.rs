//! The goals page: progress cards for every savings and payoff goal.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    endpoints::{self, format_endpoint},
    goal::models::{Goal, GoalState, GoalType},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, base, format_reais,
    },
    navigation::NavBar,
    user::UserId,
};

use super::db::get_goals;

/// Route handler for the goals page.
pub async fn get_goals_page(
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

    let goals = match get_goals(user_id, &connection) {
        Ok(goals) => goals,
        Err(error) => return error.into_response(),
    };

    goals_page(&goals).into_response()
}

fn goals_page(goals: &[Goal]) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::GOALS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="mb-4 flex items-center justify-between"
            {
                h1 class="text-2xl font-semibold" { "Metas" }

                a href=(endpoints::NEW_GOAL_VIEW) class=(BUTTON_PRIMARY_STYLE) { "Nova Meta" }
            }

            @if goals.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "Nenhuma meta cadastrada. "

                    a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "Crie a primeira." }
                }
            }

            div class="grid gap-4 md:grid-cols-2"
            {
                @for goal in goals {
                    (goal_card(goal))
                }
            }
        }
    };

    base("Metas", &content)
}

fn goal_card(goal: &Goal) -> Markup {
    let percentage = goal.percentage();
    let delete_route = format_endpoint(endpoints::DELETE_GOAL, goal.id);
    let add_route = format_endpoint(endpoints::ADD_GOAL_VALUE, goal.id);

    html! {
        div class={(CARD_STYLE) " goal-card"}
        {
            div class="mb-2 flex items-center justify-between"
            {
                h2 class="text-lg font-semibold" { (goal.name) }

                span
                    class="rounded bg-gray-100 px-2 py-0.5 text-xs \
                        text-gray-700 dark:bg-gray-700 dark:text-gray-300"
                {
                    (goal.goal_type.label())
                }
            }

            div class="mb-1 h-3 w-full rounded-full bg-gray-200 dark:bg-gray-700"
            {
                div
                    class="h-3 rounded-full bg-blue-600"
                    style=(format!("width: {percentage:.0}%"));
            }

            p class="mb-2 text-sm text-gray-600 dark:text-gray-300"
            {
                (format_reais(goal.current_amount))
                " de "
                (format_reais(goal.target_amount))
                " (" (format!("{percentage:.0}")) "%)"
            }

            @if goal.goal_type == GoalType::Payoff && goal.total_installments > 0 {
                p class="mb-2 text-sm text-gray-600 dark:text-gray-300"
                {
                    "Parcelas pagas: "
                    (goal.installments_paid) " de " (goal.total_installments)
                }
            }

            form
                hx-post=(add_route)
                hx-target-4xx="#alert-container"
                hx-target-5xx="#alert-container"
                class="mb-2 flex gap-2"
            {
                input
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0.01"
                    placeholder="Valor"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Adicionar" }
            }

            button
                hx-delete=(delete_route)
                hx-target="closest .goal-card"
                hx-swap="outerHTML"
                hx-confirm="Excluir esta meta?"
                class=(BUTTON_DELETE_STYLE)
            {
                "Excluir"
            }
        }
    }
}
