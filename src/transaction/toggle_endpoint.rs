//! Defines the endpoint for toggling a transaction between pending and paid.
//!
//! Marking a transaction paid is what moves money into goals, so this
//! endpoint runs the goal ledger inside the same database transaction as the
//! status flip.

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
    goal::{PaymentKind, apply_status_change},
    html::format_reais,
    transaction::{
        PaidStatus, TransactionState,
        core::{get_transaction, set_paid_status},
        transaction_row_view,
    },
    user::UserId,
};

/// A route handler that flips a transaction between pending and paid.
///
/// Returns the re-rendered table row so htmx can swap it in place, plus an
/// out-of-band alert describing what happened to any linked goal.
pub async fn toggle_transaction_endpoint(
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

    // The status flip and the goal update must land together or not at all.
    let sql_transaction = match connection.unchecked_transaction() {
        Ok(sql_transaction) => sql_transaction,
        Err(error) => return Error::from(error).into_alert_response(),
    };

    let mut transaction = match get_transaction(transaction_id, user_id, &sql_transaction) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Error::UpdateMissingTransaction.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    let new_status = transaction.status.toggled();

    if let Err(error) = set_paid_status(transaction_id, user_id, new_status, &sql_transaction) {
        tracing::error!("could not set paid status: {error}");

        return error.into_alert_response();
    }

    let ledger_update = match apply_status_change(&transaction, new_status, &sql_transaction) {
        Ok(ledger_update) => ledger_update,
        Err(error) => {
            tracing::error!("could not update goal ledger: {error}");

            return error.into_alert_response();
        }
    };

    if let Err(error) = sql_transaction.commit() {
        tracing::error!("could not commit status toggle: {error}");

        return Error::from(error).into_alert_response();
    }

    transaction.status = new_status;
    let magnitude = format_reais(transaction.amount.abs());

    let alert = match (new_status, ledger_update) {
        (PaidStatus::Paid, Some(update)) => match update.payment {
            PaymentKind::Amortization { extra } => Alert::success(
                "Amortização!",
                &format!(
                    "{} abatido além da parcela na meta \"{}\".",
                    format_reais(extra),
                    update.goal.name
                ),
            ),
            PaymentKind::Partial { shortfall } => Alert::success(
                "Pagamento parcial",
                &format!(
                    "Faltaram {} para a parcela da meta \"{}\".",
                    format_reais(shortfall),
                    update.goal.name
                ),
            ),
            PaymentKind::Regular => Alert::success(
                "Lançamento pago!",
                &format!("{magnitude} adicionado à meta \"{}\".", update.goal.name),
            ),
        },
        (PaidStatus::Paid, None) => Alert::success_simple("Lançamento marcado como pago."),
        (PaidStatus::Pending, Some(update)) => Alert::success(
            "Lançamento pendente",
            &format!("{magnitude} estornado da meta \"{}\".", update.goal.name),
        ),
        (PaidStatus::Pending, None) => Alert::success_simple("Lançamento marcado como pendente."),
    };

    html! {
        (transaction_row_view(&transaction))
        (alert.into_html())
    }
    .into_response()
}
