//! Defines the goal data model.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{
    Connection, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    database_id::{GoalId, RuleId},
    user::UserId,
};

/// Whether a goal saves money up or pays a debt down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalType {
    /// Build up savings towards a target amount.
    Accumulate,
    /// Pay off a debt, usually in installments.
    Payoff,
}

impl GoalType {
    /// The token stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accumulate => "ACCUMULATE",
            Self::Payoff => "PAYOFF",
        }
    }

    /// The label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accumulate => "Acumular",
            Self::Payoff => "Quitar",
        }
    }
}

impl ToSql for GoalType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GoalType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "ACCUMULATE" => Ok(Self::Accumulate),
            "PAYOFF" => Ok(Self::Payoff),
            text => Err(FromSqlError::Other(
                format!("unrecognized goal type {text:?}").into(),
            )),
        }
    }
}

/// A savings or debt payoff goal.
///
/// To create a new `Goal`, use [Goal::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The user that owns this goal.
    pub user_id: UserId,
    /// The name shown on the goals page, e.g. "Reserva de emergência".
    pub name: String,
    /// Whether the goal saves money up or pays a debt down.
    pub goal_type: GoalType,
    /// The amount to reach.
    pub target_amount: f64,
    /// How much has been put towards the goal so far.
    pub current_amount: f64,
    /// The expected size of one installment. Zero when the goal is not paid
    /// in installments.
    pub installment_amount: f64,
    /// The total number of installments. Zero when the goal is not paid in
    /// installments.
    pub total_installments: i64,
    /// How many whole installments `current_amount` covers. Only maintained
    /// for payoff goals.
    pub installments_paid: i64,
    /// The fixed rule whose generated transactions feed this goal, if any.
    pub linked_rule_id: Option<RuleId>,
}

impl Goal {
    /// Create a new goal.
    pub fn build(user_id: UserId, name: &str, goal_type: GoalType) -> GoalBuilder {
        GoalBuilder {
            user_id,
            name: name.to_owned(),
            goal_type,
            target_amount: 0.0,
            current_amount: 0.0,
            installment_amount: 0.0,
            total_installments: 0,
            linked_rule_id: None,
        }
    }

    /// How far along the goal is, as a percentage clamped to [0, 100].
    ///
    /// Savings goals track the amount saved against the target. Payoff goals
    /// track the installments paid against the total number of installments.
    pub fn percentage(&self) -> f64 {
        let (progress, total) = match self.goal_type {
            GoalType::Accumulate => (self.current_amount, self.target_amount),
            GoalType::Payoff => (self.installments_paid as f64, self.total_installments as f64),
        };

        if total <= 0.0 {
            return 0.0;
        }

        (progress / total * 100.0).clamp(0.0, 100.0)
    }

    /// How much is still missing, floored at zero.
    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }
}

/// A builder for creating [Goal] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalBuilder {
    /// The user that will own the goal.
    pub user_id: UserId,
    /// The name shown on the goals page.
    pub name: String,
    /// Whether the goal saves money up or pays a debt down.
    pub goal_type: GoalType,
    /// The amount to reach. Defaults to zero.
    pub target_amount: f64,
    /// How much has already been put towards the goal. Defaults to zero.
    pub current_amount: f64,
    /// The expected size of one installment. Defaults to zero.
    pub installment_amount: f64,
    /// The total number of installments. Defaults to zero.
    pub total_installments: i64,
    /// The fixed rule whose generated transactions feed this goal.
    pub linked_rule_id: Option<RuleId>,
}

impl GoalBuilder {
    /// Set the amount to reach.
    pub fn target_amount(mut self, target_amount: f64) -> Self {
        self.target_amount = target_amount;
        self
    }

    /// Set the amount already put towards the goal.
    pub fn current_amount(mut self, current_amount: f64) -> Self {
        self.current_amount = current_amount;
        self
    }

    /// Set the expected size of one installment.
    pub fn installment_amount(mut self, installment_amount: f64) -> Self {
        self.installment_amount = installment_amount;
        self
    }

    /// Set the total number of installments.
    pub fn total_installments(mut self, total_installments: i64) -> Self {
        self.total_installments = total_installments;
        self
    }

    /// Link the goal to a fixed rule so that rule's paid transactions feed it.
    pub fn linked_rule_id(mut self, linked_rule_id: Option<RuleId>) -> Self {
        self.linked_rule_id = linked_rule_id;
        self
    }
}

/// The state needed by the goal route handlers.
#[derive(Debug, Clone)]
pub struct GoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
