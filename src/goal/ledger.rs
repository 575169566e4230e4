//! Moves money in and out of goals when transactions change paid status.
//!
//! Marking a transaction paid adds its magnitude to the linked goal, and
//! marking it pending again takes the money back out. Payoff goals also track
//! how many whole installments the accumulated amount covers.

use rusqlite::Connection;

use crate::{
    Error,
    goal::{
        db::{get_goal, get_goal_by_linked_rule, update_goal_progress},
        models::{Goal, GoalType},
    },
    rule::{descriptions_match, get_rules},
    transaction::{PaidStatus, Transaction},
};

/// How a payment compares to a goal's expected installment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaymentKind {
    /// The payment roughly matches the installment, or the goal has no
    /// installment to compare against.
    Regular,
    /// The payment fell short of the installment.
    Partial {
        /// How much was missing.
        shortfall: f64,
    },
    /// The payment exceeded the installment.
    Amortization {
        /// How much was paid beyond the installment.
        extra: f64,
    },
}

/// The result of applying a status change to a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerUpdate {
    /// The goal after the update.
    pub goal: Goal,
    /// How the payment compared to the goal's installment.
    pub payment: PaymentKind,
}

/// Apply a transaction's status change to the goal it feeds, if any.
///
/// `transaction` carries the status before the change, `new_status` is the
/// status it is being flipped to. Returns `None` when the status did not
/// actually change or when no goal could be resolved for the transaction.
///
/// Marking paid adds the transaction's magnitude to the goal. Marking
/// pending subtracts it again, floored at zero so a goal never goes
/// negative. For payoff goals, the installment counter is recomputed from
/// the new accumulated amount.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn apply_status_change(
    transaction: &Transaction,
    new_status: PaidStatus,
    connection: &Connection,
) -> Result<Option<LedgerUpdate>, Error> {
    if new_status == transaction.status {
        return Ok(None);
    }

    let Some(goal) = resolve_goal(transaction, connection)? else {
        return Ok(None);
    };

    let magnitude = transaction.amount.abs();

    let current_amount = match new_status {
        PaidStatus::Paid => goal.current_amount + magnitude,
        // A goal never goes negative, even if its amount was edited down
        // after the payment went in.
        PaidStatus::Pending => (goal.current_amount - magnitude).max(0.0),
    };

    let installments_paid = match goal.goal_type {
        GoalType::Payoff if goal.installment_amount > 0.0 => {
            (current_amount / goal.installment_amount).floor() as i64
        }
        GoalType::Payoff => 0,
        GoalType::Accumulate => goal.installments_paid,
    };

    update_goal_progress(goal.id, current_amount, installments_paid, connection)?;

    let payment = classify_payment(magnitude, goal.installment_amount);
    let goal = Goal {
        current_amount,
        installments_paid,
        ..goal
    };

    Ok(Some(LedgerUpdate { goal, payment }))
}

/// Find the goal a transaction feeds.
///
/// An explicit goal link on the transaction always wins. Failing that,
/// transactions generated from a fixed rule fall back to the goal linked to
/// the rule whose description matches theirs.
fn resolve_goal(
    transaction: &Transaction,
    connection: &Connection,
) -> Result<Option<Goal>, Error> {
    if let Some(goal_id) = transaction.goal_id {
        return match get_goal(goal_id, transaction.user_id, connection) {
            Ok(goal) => Ok(Some(goal)),
            // A dangling link is not an error, the payment just does not
            // feed a goal.
            Err(Error::NotFound) => Ok(None),
            Err(error) => Err(error),
        };
    }

    if !transaction.is_recurring {
        return Ok(None);
    }

    for rule in get_rules(transaction.user_id, connection)? {
        if !descriptions_match(&rule.description, &transaction.description) {
            continue;
        }

        if let Some(goal) = get_goal_by_linked_rule(rule.id, transaction.user_id, connection)? {
            return Ok(Some(goal));
        }
    }

    Ok(None)
}

/// Compare a payment against a goal's expected installment.
///
/// Payments more than 10% over the installment count as amortizations,
/// payments more than 10% under count as partial. Goals without an
/// installment treat every payment as regular.
pub fn classify_payment(amount: f64, installment_amount: f64) -> PaymentKind {
    if installment_amount <= 0.0 {
        return PaymentKind::Regular;
    }

    if amount > installment_amount * 1.1 {
        PaymentKind::Amortization {
            extra: amount - installment_amount,
        }
    } else if amount < installment_amount * 0.9 {
        PaymentKind::Partial {
            shortfall: installment_amount - amount,
        }
    } else {
        PaymentKind::Regular
    }
}
