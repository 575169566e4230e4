//! Defines the endpoint for deleting a goal.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    Error,
    alert::Alert,
    database_id::GoalId,
    goal::{db::delete_goal, models::GoalState},
    user::UserId,
};

/// A route handler for deleting a goal.
///
/// The delete button targets its own card with `hx-swap="outerHTML"`, so the
/// success response carries an empty body that removes the card, plus an
/// out-of-band alert. Transactions linked to the goal are kept, the foreign
/// key clears their link.
pub async fn delete_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserId>,
    Path(goal_id): Path<GoalId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = delete_goal(goal_id, user_id, &connection) {
        tracing::error!("could not delete goal: {error}");

        return error.into_alert_response();
    }

    let alert = Alert::success_simple("Meta excluída.");

    html! { (alert.into_html()) }.into_response()
}

#[cfg(test)]
mod delete_goal_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        goal::{
            db::{create_goal, get_goals},
            models::{Goal, GoalState, GoalType},
        },
        transaction::{Transaction, TransactionKind, create_transaction, get_transaction},
        user::{UserId, create_user},
    };

    use super::delete_goal_endpoint;

    fn get_test_state() -> (GoalState, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let user_id = create_user("test", PasswordHash::new_unchecked("hunter2"), &connection)
            .unwrap()
            .id;

        (
            GoalState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
        )
    }

    #[tokio::test]
    async fn deleting_goal_keeps_linked_transactions() {
        let (state, user_id) = get_test_state();

        let (goal, transaction) = {
            let connection = state.db_connection.lock().unwrap();

            let goal = create_goal(
                Goal::build(user_id, "Reserva", GoalType::Accumulate).target_amount(1000.0),
                &connection,
            )
            .unwrap();

            let transaction = create_transaction(
                Transaction::build(
                    user_id,
                    TransactionKind::Expense,
                    100.0,
                    date!(2024 - 03 - 10),
                    "Aporte reserva",
                )
                .goal_id(Some(goal.id)),
                &connection,
            )
            .unwrap();

            (goal, transaction)
        };

        let response =
            delete_goal_endpoint(State(state.clone()), Extension(user_id), Path(goal.id)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_goals(user_id, &connection), Ok(vec![]));

        let kept = get_transaction(transaction.id, user_id, &connection).unwrap();
        assert_eq!(kept.goal_id, None);
    }

    #[tokio::test]
    async fn deleting_missing_goal_returns_not_found() {
        let (state, user_id) = get_test_state();

        let response = delete_goal_endpoint(State(state), Extension(user_id), Path(999)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}