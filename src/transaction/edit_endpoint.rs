//! Defines the page and endpoint for editing an existing transaction.

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
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    month::MonthKey,
    transaction::{
        TransactionState,
        core::{get_transaction, update_transaction},
        create_endpoint::{FormValues, TransactionForm, transaction_form_page},
    },
    user::UserId,
};

/// Route handler for the page with the edit transaction form.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let transaction = match get_transaction(transaction_id, user_id, &connection) {
        Ok(transaction) => transaction,
        Err(error) => return error.into_response(),
    };

    transaction_form_page(
        "Editar Lançamento",
        "put",
        &format_endpoint(endpoints::PUT_TRANSACTION, transaction.id),
        &FormValues {
            date: transaction.date,
            kind: transaction.kind,
            amount: Some(transaction.amount),
            description: &transaction.description,
            category: &transaction.category,
            classification: transaction.classification,
        },
    )
    .into_response()
}

/// A route handler for updating an existing transaction.
///
/// Redirects to the dashboard for the transaction's (possibly new) month on
/// success.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    if !form.amount.is_finite() || form.amount <= 0.0 {
        return Error::InvalidAmount(form.amount).into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let mut transaction = match get_transaction(transaction_id, user_id, &connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Error::UpdateMissingTransaction.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    transaction.date = form.date;
    transaction.kind = form.kind;
    transaction.amount = form.kind.signed_amount(form.amount);
    transaction.description = form.description.trim().to_owned();
    transaction.category = form.category.trim().to_owned();
    transaction.classification = form.classification;

    if let Err(error) = update_transaction(&transaction, &connection) {
        tracing::error!("could not update transaction: {error}");

        return error.into_alert_response();
    }

    let month = MonthKey::from_date(form.date);

    (
        HxRedirect(format!("{}?month={month}", endpoints::DASHBOARD_VIEW)),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod update_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        transaction::{
            Classification, Transaction, TransactionKind, TransactionState, create_transaction,
            get_transaction,
        },
        user::{UserId, create_user},
    };

    use super::{TransactionForm, update_transaction_endpoint};

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
    async fn updates_fields_and_recomputes_sign() {
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

        let form = TransactionForm {
            date: date!(2024 - 03 - 20),
            kind: TransactionKind::Income,
            amount: 75.0,
            description: "Reembolso".to_owned(),
            category: "Outros".to_owned(),
            classification: Classification::Lifestyle,
        };

        let response = update_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction.id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        let got = get_transaction(transaction.id, user_id, &connection).unwrap();
        assert_eq!(got.amount, 75.0);
        assert_eq!(got.kind, TransactionKind::Income);
        assert_eq!(got.description, "Reembolso");
    }

    #[tokio::test]
    async fn updating_missing_transaction_returns_not_found() {
        let (state, user_id) = get_test_state();

        let form = TransactionForm {
            date: date!(2024 - 03 - 20),
            kind: TransactionKind::Expense,
            amount: 75.0,
            description: "Mercado".to_owned(),
            category: "Outros".to_owned(),
            classification: Classification::Essential,
        };

        let response =
            update_transaction_endpoint(State(state), Extension(user_id), Path(999), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}