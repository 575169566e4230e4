//! The monthly reconciler: turns fixed rules into transactions.
//!
//! Once per month (or on demand), each of a user's fixed rules must be
//! represented by one transaction in that month. Existing transactions whose
//! description matches a rule are adopted and retagged instead of duplicated,
//! and only the rules left unmatched get a new pending transaction.

use rusqlite::Connection;

use crate::{
    Error,
    month::MonthKey,
    rule::{db::get_rules, matching::descriptions_match, models::FixedRule},
    transaction::{Transaction, create_transaction, get_transactions_for_month},
    user::UserId,
};

/// Create the generation log table in the database.
///
/// One row per user-month that has already been reconciled. The unique
/// constraint is what makes reconciliation idempotent.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_generation_log_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS generation_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                year_month TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                UNIQUE(user_id, year_month)
                )",
        (),
    )?;

    Ok(())
}

/// Ensure every fixed rule of `user_id` is represented by one transaction in
/// `month`. Returns how many transactions were generated.
///
/// Without `force`, a month that was already reconciled is skipped entirely.
/// With `force`, the month is re-checked and only the rules that lost their
/// transaction get a new one, matching still prevents duplicates.
///
/// The caller decides the transactional scope: run this inside a database
/// transaction to get all-or-nothing behavior for the retagging and the log
/// marker. A generation failure for a single rule is logged and skipped so
/// one bad rule cannot block the rest.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn reconcile(
    user_id: UserId,
    month: MonthKey,
    force: bool,
    connection: &Connection,
) -> Result<usize, Error> {
    let rules = get_rules(user_id, connection)?;

    // A month with no rules still counts as reconciled.
    if rules.is_empty() {
        mark_month_generated(user_id, month, connection)?;
        return Ok(0);
    }

    if !force && is_month_generated(user_id, month, connection)? {
        return Ok(0);
    }

    let transactions = get_transactions_for_month(user_id, month, connection)?;

    // Each transaction is retagged by the first rule whose description
    // matches, in rule creation order.
    for transaction in &transactions {
        for rule in &rules {
            if !descriptions_match(&rule.description, &transaction.description) {
                continue;
            }

            if !transaction.is_recurring || transaction.classification != rule.classification {
                retag_transaction(transaction, rule, connection)?;
            }

            break;
        }
    }

    let mut generated = 0;

    for rule in &rules {
        // A rule already represented by any transaction this month, even one
        // claimed by an earlier rule, does not generate a duplicate.
        let is_represented = transactions
            .iter()
            .any(|transaction| descriptions_match(&rule.description, &transaction.description));

        if is_represented {
            continue;
        }

        match generate_transaction(rule, month, connection) {
            Ok(()) => generated += 1,
            Err(error) => {
                tracing::warn!(
                    "could not generate transaction for rule {} ({}): {error}",
                    rule.id,
                    rule.description
                );
            }
        }
    }

    mark_month_generated(user_id, month, connection)?;

    Ok(generated)
}

/// Check whether `month` has already been reconciled for `user_id`.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn is_month_generated(
    user_id: UserId,
    month: MonthKey,
    connection: &Connection,
) -> Result<bool, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM generation_log WHERE user_id = ?1 AND year_month = ?2",
        (user_id.as_i64(), month),
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

fn mark_month_generated(
    user_id: UserId,
    month: MonthKey,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT OR IGNORE INTO generation_log (user_id, year_month) VALUES (?1, ?2)",
        (user_id.as_i64(), month),
    )?;

    Ok(())
}

fn generate_transaction(
    rule: &FixedRule,
    month: MonthKey,
    connection: &Connection,
) -> Result<(), Error> {
    // Days past the end of the month land on its last day.
    let date = month.date_for_day(rule.day_of_month);

    create_transaction(
        Transaction::build(rule.user_id, rule.kind, rule.amount, date, &rule.description)
            .category(&rule.category)
            .classification(rule.classification)
            .recurring(true),
        connection,
    )?;

    Ok(())
}

fn retag_transaction(
    transaction: &Transaction,
    rule: &FixedRule,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "UPDATE \"transaction\" SET is_recurring = 1, classification = ?1, category = ?2
         WHERE id = ?3",
        (rule.classification, &rule.category, transaction.id),
    )?;

    Ok(())
}

#[cfg(test)]
mod reconcile_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        month::MonthKey,
        rule::{db::create_rule, models::FixedRule},
        transaction::{
            Classification, PaidStatus, Transaction, TransactionKind, create_transaction,
            delete_transaction, get_transactions_for_month,
        },
        user::{UserId, create_user},
    };

    use super::{is_month_generated, reconcile};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn test_user_id(connection: &Connection) -> UserId {
        create_user("test", PasswordHash::new_unchecked("hunter2"), connection)
            .unwrap()
            .id
    }

    fn rent_rule(user_id: UserId, connection: &Connection) -> FixedRule {
        create_rule(
            FixedRule::build(user_id, TransactionKind::Expense, 1200.0, "Aluguel", 5)
                .category("Moradia")
                .classification(Classification::Essential),
            connection,
        )
        .unwrap()
    }

    #[test]
    fn generates_one_pending_transaction_per_rule() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        rent_rule(user_id, &connection);
        let march = MonthKey::parse("2024-03").unwrap();

        let generated = reconcile(user_id, march, false, &connection).unwrap();

        assert_eq!(generated, 1);

        let transactions = get_transactions_for_month(user_id, march, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].status, PaidStatus::Pending);
        assert!(transactions[0].is_recurring);
        assert_eq!(transactions[0].date, date!(2024 - 03 - 05));
        assert_eq!(transactions[0].category, "Moradia");
    }

    #[test]
    fn expense_rules_generate_negative_amounts() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        rent_rule(user_id, &connection);
        let march = MonthKey::parse("2024-03").unwrap();

        reconcile(user_id, march, false, &connection).unwrap();

        let transactions = get_transactions_for_month(user_id, march, &connection).unwrap();
        assert_eq!(transactions[0].amount, -1200.0);
    }

    #[test]
    fn reconciling_twice_generates_nothing_new() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        rent_rule(user_id, &connection);
        let march = MonthKey::parse("2024-03").unwrap();

        reconcile(user_id, march, false, &connection).unwrap();
        let second = reconcile(user_id, march, false, &connection).unwrap();

        assert_eq!(second, 0);
        assert_eq!(
            get_transactions_for_month(user_id, march, &connection)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn matching_transaction_is_adopted_instead_of_duplicated() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        rent_rule(user_id, &connection);
        let march = MonthKey::parse("2024-03").unwrap();

        // The user recorded their rent by hand before reconciliation ran.
        create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                1200.0,
                date!(2024 - 03 - 03),
                "aluguel apartamento",
            )
            .classification(Classification::Lifestyle),
            &connection,
        )
        .unwrap();

        let generated = reconcile(user_id, march, false, &connection).unwrap();

        assert_eq!(generated, 0);

        let transactions = get_transactions_for_month(user_id, march, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert!(transactions[0].is_recurring);
        assert_eq!(transactions[0].classification, Classification::Essential);
        assert_eq!(transactions[0].category, "Moradia");
    }

    #[test]
    fn first_matching_rule_claims_the_transaction() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        create_rule(
            FixedRule::build(user_id, TransactionKind::Expense, 120.0, "Internet fibra", 10)
                .category("Moradia")
                .classification(Classification::Lifestyle),
            &connection,
        )
        .unwrap();
        create_rule(
            FixedRule::build(user_id, TransactionKind::Expense, 99.0, "Internet", 10)
                .category("Serviços")
                .classification(Classification::Investment),
            &connection,
        )
        .unwrap();
        let march = MonthKey::parse("2024-03").unwrap();

        create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                120.0,
                date!(2024 - 03 - 08),
                "Internet",
            ),
            &connection,
        )
        .unwrap();

        reconcile(user_id, march, false, &connection).unwrap();

        // Both rules are represented by the one matching transaction, so
        // nothing new is generated either.
        let transactions = get_transactions_for_month(user_id, march, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].classification, Classification::Lifestyle);
        assert_eq!(transactions[0].category, "Moradia");
    }

    #[test]
    fn recurring_transaction_with_matching_classification_keeps_its_category() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        rent_rule(user_id, &connection);
        let march = MonthKey::parse("2024-03").unwrap();

        create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                1200.0,
                date!(2024 - 03 - 05),
                "Aluguel",
            )
            .category("Apartamento")
            .classification(Classification::Essential)
            .recurring(true),
            &connection,
        )
        .unwrap();

        reconcile(user_id, march, false, &connection).unwrap();

        let transactions = get_transactions_for_month(user_id, march, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].category, "Apartamento");
    }

    #[test]
    fn due_day_is_clamped_to_the_end_of_short_months() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        create_rule(
            FixedRule::build(user_id, TransactionKind::Expense, 99.0, "Internet", 31),
            &connection,
        )
        .unwrap();

        let february = MonthKey::parse("2023-02").unwrap();
        reconcile(user_id, february, false, &connection).unwrap();

        let transactions = get_transactions_for_month(user_id, february, &connection).unwrap();
        assert_eq!(transactions[0].date, date!(2023 - 02 - 28));

        let leap_february = MonthKey::parse("2024-02").unwrap();
        reconcile(user_id, leap_february, false, &connection).unwrap();

        let transactions =
            get_transactions_for_month(user_id, leap_february, &connection).unwrap();
        assert_eq!(transactions[0].date, date!(2024 - 02 - 29));
    }

    #[test]
    fn month_without_rules_is_still_marked_reconciled() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        let march = MonthKey::parse("2024-03").unwrap();

        let generated = reconcile(user_id, march, false, &connection).unwrap();

        assert_eq!(generated, 0);
        assert!(is_month_generated(user_id, march, &connection).unwrap());

        // A rule added afterwards does not sneak into the marked month.
        rent_rule(user_id, &connection);
        let generated = reconcile(user_id, march, false, &connection).unwrap();
        assert_eq!(generated, 0);
    }

    #[test]
    fn force_regenerates_only_the_missing_transactions() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        rent_rule(user_id, &connection);
        create_rule(
            FixedRule::build(user_id, TransactionKind::Income, 5000.0, "Salário", 1),
            &connection,
        )
        .unwrap();
        let march = MonthKey::parse("2024-03").unwrap();

        reconcile(user_id, march, false, &connection).unwrap();

        // The user deletes the generated rent entry, then forces a re-run.
        let transactions = get_transactions_for_month(user_id, march, &connection).unwrap();
        let rent = transactions
            .iter()
            .find(|transaction| transaction.description == "Aluguel")
            .unwrap();
        delete_transaction(rent.id, user_id, &connection).unwrap();

        let generated = reconcile(user_id, march, true, &connection).unwrap();

        assert_eq!(generated, 1);
        assert_eq!(
            get_transactions_for_month(user_id, march, &connection)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn reconciliation_is_scoped_to_one_user() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        let other_user_id =
            create_user("other", PasswordHash::new_unchecked("hunter2"), &connection)
                .unwrap()
                .id;
        rent_rule(user_id, &connection);
        let march = MonthKey::parse("2024-03").unwrap();

        reconcile(user_id, march, false, &connection).unwrap();

        assert_eq!(
            get_transactions_for_month(other_user_id, march, &connection),
            Ok(vec![])
        );
        assert!(!is_month_generated(other_user_id, march, &connection).unwrap());
    }
}