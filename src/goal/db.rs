//! Database queries for goals.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    database_id::{GoalId, RuleId},
    goal::models::{Goal, GoalBuilder},
    user::UserId,
};

/// Create the goal table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                goal_type TEXT NOT NULL,
                target_amount REAL NOT NULL DEFAULT 0,
                current_amount REAL NOT NULL DEFAULT 0,
                installment_amount REAL NOT NULL DEFAULT 0,
                total_installments INTEGER NOT NULL DEFAULT 0,
                installments_paid INTEGER NOT NULL DEFAULT 0,
                linked_rule_id INTEGER,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY(linked_rule_id) REFERENCES fixed_rule(id) ON DELETE SET NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create a new goal in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidRuleLink] if the builder's linked rule ID does not refer
///   to a real fixed rule,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_goal(builder: GoalBuilder, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(
            "INSERT INTO goal
                (user_id, name, goal_type, target_amount, current_amount,
                 installment_amount, total_installments, installments_paid, linked_rule_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
             RETURNING id, user_id, name, goal_type, target_amount, current_amount,
                 installment_amount, total_installments, installments_paid, linked_rule_id",
        )?
        .query_row(
            (
                builder.user_id.as_i64(),
                &builder.name,
                builder.goal_type,
                builder.target_amount,
                builder.current_amount,
                builder.installment_amount,
                builder.total_installments,
                builder.linked_rule_id,
            ),
            map_goal_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidRuleLink(builder.linked_rule_id),
            error => error.into(),
        })
}

/// Retrieve a goal owned by `user_id` by its `id`.
///
/// # Errors
/// This function will return an [Error::NotFound] if `id` does not refer to
/// a goal owned by the user, or an [Error::SqlError] for other SQL errors.
pub fn get_goal(id: GoalId, user_id: UserId, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, goal_type, target_amount, current_amount,
                installment_amount, total_installments, installments_paid, linked_rule_id
             FROM goal
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_goal_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's goals, oldest first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_goals(user_id: UserId, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, goal_type, target_amount, current_amount,
                installment_amount, total_installments, installments_paid, linked_rule_id
             FROM goal
             WHERE user_id = :user_id
             ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the goal fed by the fixed rule `rule_id`, if there is one.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_goal_by_linked_rule(
    rule_id: RuleId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Option<Goal>, Error> {
    let result = connection
        .prepare(
            "SELECT id, user_id, name, goal_type, target_amount, current_amount,
                installment_amount, total_installments, installments_paid, linked_rule_id
             FROM goal
             WHERE linked_rule_id = :linked_rule_id AND user_id = :user_id",
        )?
        .query_row(
            &[(":linked_rule_id", &rule_id), (":user_id", &user_id.as_i64())],
            map_goal_row,
        );

    match result {
        Ok(goal) => Ok(Some(goal)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Overwrite a goal's progress fields.
///
/// # Errors
/// This function will return an [Error::UpdateMissingGoal] if the goal does
/// not exist, or an [Error::SqlError] for other SQL errors.
pub fn update_goal_progress(
    id: GoalId,
    current_amount: f64,
    installments_paid: i64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE goal SET current_amount = ?1, installments_paid = ?2 WHERE id = ?3",
        (current_amount, installments_paid, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    Ok(())
}

/// Delete a goal owned by `user_id`.
///
/// Transactions that point at the goal keep existing, their goal link is
/// cleared by the foreign key's ON DELETE SET NULL.
///
/// # Errors
/// This function will return an [Error::DeleteMissingGoal] if the goal does
/// not exist, or an [Error::SqlError] for other SQL errors.
pub fn delete_goal(id: GoalId, user_id: UserId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM goal WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}

/// Map a database row to a [Goal].
fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        name: row.get(2)?,
        goal_type: row.get(3)?,
        target_amount: row.get(4)?,
        current_amount: row.get(5)?,
        installment_amount: row.get(6)?,
        total_installments: row.get(7)?,
        installments_paid: row.get(8)?,
        linked_rule_id: row.get(9)?,
    })
}

#[cfg(test)]
mod goal_db_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::PasswordHash,
        db::initialize,
        user::{UserId, create_user},
    };

    use super::{
        Goal, create_goal, delete_goal, get_goal, get_goal_by_linked_rule, get_goals,
        update_goal_progress,
    };
    use crate::goal::models::GoalType;

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

    #[test]
    fn create_and_get_goal() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let goal = create_goal(
            Goal::build(user_id, "Reserva", GoalType::Accumulate).target_amount(1000.0),
            &connection,
        )
        .unwrap();

        let got = get_goal(goal.id, user_id, &connection).unwrap();

        assert_eq!(got, goal);
        assert_eq!(got.current_amount, 0.0);
    }

    #[test]
    fn create_fails_on_invalid_rule_link() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        let rule_id = Some(42);

        let result = create_goal(
            Goal::build(user_id, "Financiamento", GoalType::Payoff).linked_rule_id(rule_id),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidRuleLink(rule_id)));
    }

    #[test]
    fn get_goal_by_linked_rule_returns_none_when_unlinked() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        create_goal(
            Goal::build(user_id, "Reserva", GoalType::Accumulate),
            &connection,
        )
        .unwrap();

        let got = get_goal_by_linked_rule(1, user_id, &connection).unwrap();

        assert_eq!(got, None);
    }

    #[test]
    fn update_goal_progress_persists() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let goal = create_goal(
            Goal::build(user_id, "Financiamento", GoalType::Payoff)
                .target_amount(1200.0)
                .installment_amount(100.0)
                .total_installments(12),
            &connection,
        )
        .unwrap();

        update_goal_progress(goal.id, 300.0, 3, &connection).unwrap();

        let got = get_goal(goal.id, user_id, &connection).unwrap();
        assert_eq!(got.current_amount, 300.0);
        assert_eq!(got.installments_paid, 3);
    }

    #[test]
    fn delete_goal_removes_the_row() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let goal = create_goal(
            Goal::build(user_id, "Reserva", GoalType::Accumulate),
            &connection,
        )
        .unwrap();

        delete_goal(goal.id, user_id, &connection).unwrap();

        assert_eq!(get_goals(user_id, &connection), Ok(vec![]));
    }

    #[test]
    fn delete_missing_goal_returns_error() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let result = delete_goal(999, user_id, &connection);

        assert_eq!(result, Err(Error::DeleteMissingGoal));
    }
}