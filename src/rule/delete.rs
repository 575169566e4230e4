//! Defines the endpoint for deleting a fixed rule.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    Error,
    alert::Alert,
    database_id::RuleId,
    rule::{db::delete_rule, models::RuleState},
    user::UserId,
};

/// A route handler for deleting a fixed rule.
///
/// The delete button targets its own table row with `hx-swap="outerHTML"`, so
/// the success response carries an empty body that removes the row, plus an
/// out-of-band alert. Transactions that were already generated from the rule
/// are kept.
pub async fn delete_rule_endpoint(
    State(state): State<RuleState>,
    Extension(user_id): Extension<UserId>,
    Path(rule_id): Path<RuleId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = delete_rule(rule_id, user_id, &connection) {
        tracing::error!("could not delete fixed rule: {error}");

        return error.into_alert_response();
    }

    let alert = Alert::success_simple("Lançamento fixo excluído.");

    html! { (alert.into_html()) }.into_response()
}

#[cfg(test)]
mod delete_rule_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        rule::{
            db::{create_rule, get_rules},
            models::{FixedRule, RuleState},
        },
        transaction::TransactionKind,
        user::{UserId, create_user},
    };

    use super::delete_rule_endpoint;

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
    async fn deletes_the_rule() {
        let (state, user_id) = get_test_state();

        let rule = {
            let connection = state.db_connection.lock().unwrap();
            create_rule(
                FixedRule::build(user_id, TransactionKind::Expense, 1200.0, "Aluguel", 5),
                &connection,
            )
            .unwrap()
        };

        let response =
            delete_rule_endpoint(State(state.clone()), Extension(user_id), Path(rule.id)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_rules(user_id, &connection), Ok(vec![]));
    }

    #[tokio::test]
    async fn deleting_missing_rule_returns_not_found() {
        let (state, user_id) = get_test_state();

        let response = delete_rule_endpoint(State(state), Extension(user_id), Path(999)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}