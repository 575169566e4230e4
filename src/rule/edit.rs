//! The edit fixed rule page and the endpoint for updating rules.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    database_id::RuleId,
    endpoints::{self, format_endpoint},
    rule::{
        create::{RuleForm, RuleFormValues, rule_form_page},
        db::{get_rule, update_rule},
        models::RuleState,
    },
    user::UserId,
};

/// Route handler for the page with the edit fixed rule form.
pub async fn get_edit_rule_page(
    State(state): State<RuleState>,
    Extension(user_id): Extension<UserId>,
    Path(rule_id): Path<RuleId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let rule = match get_rule(rule_id, user_id, &connection) {
        Ok(rule) => rule,
        Err(error) => return error.into_response(),
    };

    rule_form_page(
        "Editar Lançamento Fixo",
        "put",
        &format_endpoint(endpoints::PUT_RULE, rule.id),
        &RuleFormValues {
            kind: rule.kind,
            description: &rule.description,
            amount: Some(rule.amount),
            day_of_month: rule.day_of_month,
            category: &rule.category,
            classification: rule.classification,
        },
    )
    .into_response()
}

/// A route handler for updating an existing fixed rule.
///
/// Changes only apply to months reconciled after the edit, transactions that
/// were already generated keep their values.
pub async fn update_rule_endpoint(
    State(state): State<RuleState>,
    Extension(user_id): Extension<UserId>,
    Path(rule_id): Path<RuleId>,
    Form(form): Form<RuleForm>,
) -> Response {
    if !form.amount.is_finite() || form.amount <= 0.0 {
        return Error::InvalidAmount(form.amount).into_alert_response();
    }

    if !(1..=31).contains(&form.day_of_month) {
        return Error::InvalidDayOfMonth(form.day_of_month).into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let mut rule = match get_rule(rule_id, user_id, &connection) {
        Ok(rule) => rule,
        Err(Error::NotFound) => return Error::UpdateMissingRule.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    rule.kind = form.kind;
    rule.description = form.description.trim().to_owned();
    rule.amount = form.amount.abs();
    rule.day_of_month = form.day_of_month as u8;
    rule.category = form.category.trim().to_owned();
    rule.classification = form.classification;

    if let Err(error) = update_rule(&rule, &connection) {
        tracing::error!("could not update fixed rule: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::RULES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod update_rule_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        rule::{
            create::RuleForm,
            db::{create_rule, get_rule},
            models::{FixedRule, RuleState},
        },
        transaction::{Classification, TransactionKind},
        user::{UserId, create_user},
    };

    use super::update_rule_endpoint;

    fn get_test_state() -> (RuleState, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let user_id = create_user("test", PasswordHash::new_unchecked("hunter2"), &connection)
            .unwrap()
            .id;

        (
            RuleState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
        )
    }

    #[tokio::test]
    async fn updates_rule_fields() {
        let (state, user_id) = get_test_state();

        let rule = {
            let connection = state.db_connection.lock().unwrap();
            create_rule(
                FixedRule::build(user_id, TransactionKind::Expense, 1200.0, "Aluguel", 5),
                &connection,
            )
            .unwrap()
        };

        let form = RuleForm {
            kind: TransactionKind::Expense,
            description: "Aluguel novo".to_owned(),
            amount: 1300.0,
            day_of_month: 10,
            category: "Moradia".to_owned(),
            classification: Classification::Essential,
        };

        let response = update_rule_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(rule.id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        let got = get_rule(rule.id, user_id, &connection).unwrap();
        assert_eq!(got.description, "Aluguel novo");
        assert_eq!(got.amount, 1300.0);
        assert_eq!(got.day_of_month, 10);
    }

    #[tokio::test]
    async fn updating_missing_rule_returns_not_found() {
        let (state, user_id) = get_test_state();

        let form = RuleForm {
            kind: TransactionKind::Expense,
            description: "Aluguel".to_owned(),
            amount: 1200.0,
            day_of_month: 5,
            category: "Moradia".to_owned(),
            classification: Classification::Essential,
        };

        let response =
            update_rule_endpoint(State(state), Extension(user_id), Path(999), Form(form)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}