//! Defines the endpoint for forcing fixed entry generation for a month.

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
use serde::Deserialize;

use crate::{
    Error, endpoints,
    month::MonthKey,
    rule::{models::RuleState, reconcile::reconcile},
    user::UserId,
};

/// The form data for forcing fixed entry generation.
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    /// The month to generate entries for, e.g. "2024-03".
    pub month: String,
}

/// A route handler that re-runs the reconciler for one month even if it has
/// already been reconciled. Rules whose transaction went missing get a new
/// one, everything else is left alone.
///
/// Redirects back to the dashboard for that month on success.
pub async fn generate_fixed_endpoint(
    State(state): State<RuleState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<GenerateForm>,
) -> Response {
    let month = match MonthKey::parse(&form.month) {
        Ok(month) => month,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    // Retagging, generation, and the log marker land together or not at all.
    let sql_transaction = match connection.unchecked_transaction() {
        Ok(sql_transaction) => sql_transaction,
        Err(error) => return Error::from(error).into_alert_response(),
    };

    let generated = match reconcile(user_id, month, true, &sql_transaction) {
        Ok(generated) => generated,
        Err(error) => {
            tracing::error!("could not reconcile {month}: {error}");

            return error.into_alert_response();
        }
    };

    if let Err(error) = sql_transaction.commit() {
        tracing::error!("could not commit reconciliation: {error}");

        return Error::from(error).into_alert_response();
    }

    tracing::info!("forced reconciliation of {month} generated {generated} transactions");

    (
        HxRedirect(format!("{}?month={month}", endpoints::DASHBOARD_VIEW)),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod generate_fixed_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        month::MonthKey,
        rule::{db::create_rule, models::{FixedRule, RuleState}},
        transaction::{TransactionKind, get_transactions_for_month},
        user::{UserId, create_user},
    };

    use super::{GenerateForm, generate_fixed_endpoint};

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
    async fn generates_entries_and_redirects_to_the_month() {
        let (state, user_id) = get_test_state();

        {
            let connection = state.db_connection.lock().unwrap();
            create_rule(
                FixedRule::build(user_id, TransactionKind::Expense, 1200.0, "Aluguel", 5),
                &connection,
            )
            .unwrap();
        }

        let form = GenerateForm {
            month: "2024-03".to_owned(),
        };

        let response =
            generate_fixed_endpoint(State(state.clone()), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let redirect = response
            .headers()
            .get(HX_REDIRECT)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        assert_eq!(redirect, "/dashboard?month=2024-03");

        let connection = state.db_connection.lock().unwrap();
        let march = MonthKey::parse("2024-03").unwrap();
        let transactions = get_transactions_for_month(user_id, march, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
    }

    #[tokio::test]
    async fn rejects_malformed_month() {
        let (state, user_id) = get_test_state();

        let form = GenerateForm {
            month: "March 2024".to_owned(),
        };

        let response = generate_fixed_endpoint(State(state), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}