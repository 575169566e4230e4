//! Defines the endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    Error,
    alert::Alert,
    database_id::TransactionId,
    transaction::{TransactionState, core::delete_transaction},
    user::UserId,
};

/// A route handler for deleting a transaction.
///
/// The delete button targets its own table row with `hx-swap="outerHTML"`, so
/// the success response carries an empty body that removes the row, plus an
/// out-of-band alert.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = delete_transaction(transaction_id, user_id, &connection) {
        tracing::error!("could not delete transaction: {error}");

        return error.into_alert_response();
    }

    let alert = Alert::success_simple("Lançamento excluído.");

    html! { (alert.into_html()) }.into_response()
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
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
        transaction::{
            Transaction, TransactionKind, TransactionState, core::count_transactions,
            create_transaction,
        },
        user::{UserId, create_user},
    };

    use super::delete_transaction_endpoint;

    fn get_test_state() -> (TransactionState, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let user_id = create_user("test", PasswordHash::new_unchecked("hunter2"), &connection)
            .unwrap()
            .id;

        (
            TransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
        )
    }

    #[tokio::test]
    async fn deletes_the_transaction() {
        let (state, user_id) = get_test_state();

        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(
                    user_id,
                    TransactionKind::Expense,
                    50.0,
                    date!(2024 - 03 - 15),
                    "Mercado",
                ),
                &connection,
            )
            .unwrap()
        };

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(user_id, &connection), Ok(0));
    }

    #[tokio::test]
    async fn deleting_missing_transaction_returns_not_found() {
        let (state, user_id) = get_test_state();

        let response =
            delete_transaction_endpoint(State(state), Extension(user_id), Path(999)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}