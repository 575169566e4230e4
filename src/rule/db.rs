//! Database queries for fixed rules.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    database_id::RuleId,
    rule::models::{FixedRule, FixedRuleBuilder},
    user::UserId,
};

/// Create the fixed rule table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_rule_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS fixed_rule (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                day_of_month INTEGER NOT NULL,
                classification TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a new fixed rule in the database from a builder.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_rule(builder: FixedRuleBuilder, connection: &Connection) -> Result<FixedRule, Error> {
    connection
        .prepare(
            "INSERT INTO fixed_rule
                (user_id, kind, category, description, amount, day_of_month, classification)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, kind, category, description, amount, day_of_month,
                 classification",
        )?
        .query_row(
            (
                builder.user_id.as_i64(),
                builder.kind,
                &builder.category,
                &builder.description,
                builder.amount,
                builder.day_of_month,
                builder.classification,
            ),
            map_rule_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a fixed rule owned by `user_id` by its `id`.
///
/// # Errors
/// This function will return an [Error::NotFound] if `id` does not refer to
/// a rule owned by the user, or an [Error::SqlError] for other SQL errors.
pub fn get_rule(id: RuleId, user_id: UserId, connection: &Connection) -> Result<FixedRule, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, category, description, amount, day_of_month, classification
             FROM fixed_rule
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_rule_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's fixed rules, oldest first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_rules(user_id: UserId, connection: &Connection) -> Result<Vec<FixedRule>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, category, description, amount, day_of_month, classification
             FROM fixed_rule
             WHERE user_id = :user_id
             ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_rule_row)?
        .map(|maybe_rule| maybe_rule.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the editable fields of a fixed rule.
///
/// # Errors
/// This function will return an [Error::UpdateMissingRule] if the rule does
/// not exist, or an [Error::SqlError] for other SQL errors.
pub fn update_rule(rule: &FixedRule, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE fixed_rule
         SET kind = ?1, category = ?2, description = ?3, amount = ?4, day_of_month = ?5,
             classification = ?6
         WHERE id = ?7 AND user_id = ?8",
        (
            rule.kind,
            &rule.category,
            &rule.description,
            rule.amount,
            rule.day_of_month,
            rule.classification,
            rule.id,
            rule.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingRule);
    }

    Ok(())
}

/// Delete a fixed rule owned by `user_id`.
///
/// Transactions already generated from the rule are kept.
///
/// # Errors
/// This function will return an [Error::DeleteMissingRule] if the rule does
/// not exist, or an [Error::SqlError] for other SQL errors.
pub fn delete_rule(id: RuleId, user_id: UserId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM fixed_rule WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRule);
    }

    Ok(())
}

/// Map a database row to a [FixedRule].
fn map_rule_row(row: &Row) -> Result<FixedRule, rusqlite::Error> {
    Ok(FixedRule {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        kind: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        amount: row.get(5)?,
        day_of_month: row.get(6)?,
        classification: row.get(7)?,
    })
}
