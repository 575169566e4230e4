//! Defines the fixed rule data model.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    AppState,
    database_id::RuleId,
    transaction::{Classification, TransactionKind},
    user::UserId,
};

/// A recurring monthly entry, e.g. rent due on the 5th of every month.
///
/// Each month, the reconciler turns every rule into one transaction in that
/// month, unless a matching transaction already exists.
///
/// To create a new `FixedRule`, use [FixedRule::build].
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRule {
    /// The ID of the rule.
    pub id: RuleId,
    /// The user that owns this rule.
    pub user_id: UserId,
    /// Whether the generated transactions are income or expenses.
    pub kind: TransactionKind,
    /// The budget category for generated transactions.
    pub category: String,
    /// The description generated transactions carry, also used to match
    /// existing transactions against this rule.
    pub description: String,
    /// The magnitude of the recurring amount. The sign of generated
    /// transactions comes from `kind`.
    pub amount: f64,
    /// The day of the month the entry is due, between 1 and 31. Months
    /// shorter than this day use their last day instead.
    pub day_of_month: u8,
    /// The budget bucket for generated transactions.
    pub classification: Classification,
}

impl FixedRule {
    /// Create a new fixed rule.
    pub fn build(
        user_id: UserId,
        kind: TransactionKind,
        amount: f64,
        description: &str,
        day_of_month: u8,
    ) -> FixedRuleBuilder {
        FixedRuleBuilder {
            user_id,
            kind,
            amount: amount.abs(),
            description: description.to_owned(),
            day_of_month,
            category: "Outros".to_owned(),
            classification: Classification::Essential,
        }
    }
}

/// A builder for creating [FixedRule] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRuleBuilder {
    /// The user that will own the rule.
    pub user_id: UserId,
    /// Whether the generated transactions are income or expenses.
    pub kind: TransactionKind,
    /// The magnitude of the recurring amount.
    pub amount: f64,
    /// The description generated transactions carry.
    pub description: String,
    /// The day of the month the entry is due.
    pub day_of_month: u8,
    /// The budget category. Defaults to "Outros".
    pub category: String,
    /// The budget bucket. Defaults to essential.
    pub classification: Classification,
}

impl FixedRuleBuilder {
    /// Set the budget category.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the budget bucket.
    pub fn classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }
}

/// The state needed by the fixed rule route handlers.
#[derive(Debug, Clone)]
pub struct RuleState {
    /// The database connection for managing fixed rules.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RuleState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}