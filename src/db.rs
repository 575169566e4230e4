//! Database setup: creates the application's tables.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, goal::create_goal_table, rule::create_generation_log_table, rule::create_rule_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the application's tables if they do not exist yet.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // SQLite leaves foreign keys off by default, but goal deletion relies on
    // ON DELETE SET NULL firing.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    // Referenced tables must exist before the tables pointing at them.
    create_user_table(&transaction)?;
    create_rule_table(&transaction)?;
    create_goal_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_generation_log_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
