//! Defines the endpoint for adding a manual amount to a goal.

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
use serde::Deserialize;

use crate::{
    Error,
    database_id::GoalId,
    endpoints,
    goal::{
        db::{get_goal, update_goal_progress},
        models::{GoalState, GoalType},
    },
    user::UserId,
};

/// The form data for adding a manual amount to a goal.
#[derive(Debug, Deserialize)]
pub struct AddValueForm {
    /// How much to add, in reais. Must be positive.
    pub amount: f64,
}

/// A route handler that adds a manual amount to a goal, outside of any
/// transaction. Redirects back to the goals page on success.
pub async fn add_goal_value_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserId>,
    Path(goal_id): Path<GoalId>,
    Form(form): Form<AddValueForm>,
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

    let goal = match get_goal(goal_id, user_id, &connection) {
        Ok(goal) => goal,
        Err(Error::NotFound) => return Error::UpdateMissingGoal.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    let current_amount = goal.current_amount + form.amount;

    let installments_paid = match goal.goal_type {
        GoalType::Payoff if goal.installment_amount > 0.0 => {
            (current_amount / goal.installment_amount).floor() as i64
        }
        GoalType::Payoff => 0,
        GoalType::Accumulate => goal.installments_paid,
    };

    if let Err(error) = update_goal_progress(goal.id, current_amount, installments_paid, &connection)
    {
        tracing::error!("could not update goal: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::GOALS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
