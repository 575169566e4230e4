//! The fixed rules page: a table of every recurring monthly entry.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_reais,
    },
    navigation::NavBar,
    rule::{
        db::get_rules,
        models::{FixedRule, RuleState},
    },
    user::UserId,
};

/// Route handler for the fixed rules page.
pub async fn get_rules_page(
    State(state): State<RuleState>,
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

    rules_page(&rules).into_response()
}

fn rules_page(rules: &[FixedRule]) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::RULES_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="mb-4 flex items-center justify-between"
            {
                h1 class="text-2xl font-semibold" { "Lançamentos Fixos" }

                a href=(endpoints::NEW_RULE_VIEW) class=(BUTTON_PRIMARY_STYLE)
                {
                    "Novo Fixo"
                }
            }

            @if rules.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "Nenhum lançamento fixo cadastrado. "

                    a href=(endpoints::NEW_RULE_VIEW) class=(LINK_STYLE)
                    {
                        "Crie o primeiro."
                    }
                }
            } @else {
                table class="w-full text-left text-sm"
                {
                    thead
                    {
                        tr
                        {
                            th class=(TABLE_HEADER_STYLE) { "Descrição" }
                            th class=(TABLE_HEADER_STYLE) { "Tipo" }
                            th class=(TABLE_HEADER_STYLE) { "Valor" }
                            th class=(TABLE_HEADER_STYLE) { "Dia" }
                            th class=(TABLE_HEADER_STYLE) { "Categoria" }
                            th class=(TABLE_HEADER_STYLE) { "Classificação" }
                            th class=(TABLE_HEADER_STYLE) {}
                            th class=(TABLE_HEADER_STYLE) {}
                        }
                    }

                    tbody
                    {
                        @for rule in rules {
                            (rule_row(rule))
                        }
                    }
                }
            }
        }
    };

    base("Lançamentos Fixos", &content)
}

fn rule_row(rule: &FixedRule) -> Markup {
    let edit_route = format_endpoint(endpoints::EDIT_RULE_VIEW, rule.id);
    let delete_route = format_endpoint(endpoints::DELETE_RULE, rule.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (rule.description) }
            td class=(TABLE_CELL_STYLE) { (rule.kind.label()) }
            td class=(TABLE_CELL_STYLE) { (format_reais(rule.amount)) }
            td class=(TABLE_CELL_STYLE) { (rule.day_of_month) }
            td class=(TABLE_CELL_STYLE) { (rule.category) }
            td class=(TABLE_CELL_STYLE) { (rule.classification.label()) }

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
                    hx-confirm="Excluir este lançamento fixo?"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Excluir"
                }
            }
        }
    }
}

#[cfg(test)]
mod rules_page_tests {
    use crate::{
        rule::models::FixedRule,
        transaction::{Classification, TransactionKind},
        user::UserId,
    };

    use super::rules_page;

    #[test]
    fn empty_state_prompts_to_create_a_rule() {
        let html = rules_page(&[]).into_string();

        assert!(html.contains("Nenhum lançamento fixo cadastrado."));
    }

    #[test]
    fn table_shows_rule_fields() {
        let rule = FixedRule {
            id: 1,
            user_id: UserId::new(1),
            kind: TransactionKind::Expense,
            category: "Moradia".to_owned(),
            description: "Aluguel".to_owned(),
            amount: 1200.0,
            day_of_month: 5,
            classification: Classification::Essential,
        };

        let html = rules_page(&[rule]).into_string();

        assert!(html.contains("Aluguel"));
        assert!(html.contains("Moradia"));
        assert!(html.contains("Essenciais"));
    }
}