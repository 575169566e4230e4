//! Defines the core data models and database queries for transactions.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{GoalId, TransactionId},
    month::MonthKey,
    user::UserId,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brings money in or takes money out.
///
/// The stored amount's sign always agrees with the kind: income is positive,
/// expenses are negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Money coming in, stored with a positive amount.
    Income,
    /// Money going out, stored with a negative amount.
    Expense,
}

impl TransactionKind {
    /// The token stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }

    /// The label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Entrada",
            Self::Expense => "Saída",
        }
    }

    /// Apply this kind's sign convention to a magnitude.
    pub fn signed_amount(&self, magnitude: f64) -> f64 {
        match self {
            Self::Income => magnitude.abs(),
            Self::Expense => -magnitude.abs(),
        }
    }
}

/// Whether a transaction has been settled yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaidStatus {
    /// The transaction is expected but not yet settled.
    Pending,
    /// The transaction has been settled.
    Paid,
}

impl PaidStatus {
    /// The token stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
        }
    }

    /// The label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Paid => "Pago",
        }
    }

    /// The other status.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Pending => Self::Paid,
            Self::Paid => Self::Pending,
        }
    }
}

/// The budget bucket a transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Rent, groceries, utilities.
    Essential,
    /// Leisure and non-essential spending.
    Lifestyle,
    /// Savings and investments.
    Investment,
}

impl Classification {
    /// All classifications, in display order.
    pub const ALL: [Classification; 3] = [Self::Essential, Self::Lifestyle, Self::Investment];

    /// The token stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Essential => "ESSENTIAL",
            Self::Lifestyle => "LIFESTYLE",
            Self::Investment => "INVESTMENT",
        }
    }

    /// The label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Essential => "Essenciais",
            Self::Lifestyle => "Estilo de Vida",
            Self::Investment => "Investimentos",
        }
    }
}

macro_rules! impl_text_sql {
    ($type:ty, [$($variant:expr),+]) => {
        impl ToSql for $type {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $type {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;

                $(
                    if text == $variant.as_str() {
                        return Ok($variant);
                    }
                )+

                Err(FromSqlError::Other(
                    format!("unrecognized token {text:?}").into(),
                ))
            }
        }
    };
}

impl_text_sql!(
    TransactionKind,
    [TransactionKind::Income, TransactionKind::Expense]
);
impl_text_sql!(PaidStatus, [PaidStatus::Pending, PaidStatus::Paid]);
impl_text_sql!(
    Classification,
    [
        Classification::Essential,
        Classification::Lifestyle,
        Classification::Investment
    ]
);

/// An income or expense entry belonging to one user.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns this transaction.
    pub user_id: UserId,
    /// When the transaction happened (or is due).
    pub date: Date,
    /// The month bucket the transaction belongs to, derived from `date`.
    pub year_month: MonthKey,
    /// The budget category, e.g. "Moradia", "Salário".
    pub category: String,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The signed amount: positive for income, negative for expenses.
    pub amount: f64,
    /// Whether the transaction has been settled.
    pub status: PaidStatus,
    /// The budget bucket the transaction belongs to.
    pub classification: Classification,
    /// Whether this transaction is an instance of a fixed rule.
    pub is_recurring: bool,
    /// The goal this transaction feeds when marked paid, if any.
    pub goal_id: Option<GoalId>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// The stored amount's sign is derived from `kind`, so `amount` may be
    /// passed as a magnitude. The month bucket is derived from `date`.
    pub fn build(
        user_id: UserId,
        kind: TransactionKind,
        amount: f64,
        date: Date,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            kind,
            amount: kind.signed_amount(amount),
            date,
            description: description.to_owned(),
            category: "Outros".to_owned(),
            status: PaidStatus::Pending,
            classification: Classification::Essential,
            is_recurring: false,
            goal_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances with sensible defaults for
/// the optional fields.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The user that will own the transaction.
    pub user_id: UserId,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// The signed amount, already adjusted to match `kind`.
    pub amount: f64,
    /// The date when the transaction occurred or is due.
    pub date: Date,
    /// A human-readable description of the transaction.
    pub description: String,
    /// The budget category. Defaults to "Outros".
    pub category: String,
    /// Whether the transaction has been settled. Defaults to pending.
    pub status: PaidStatus,
    /// The budget bucket. Defaults to essential.
    pub classification: Classification,
    /// Whether this transaction is an instance of a fixed rule.
    pub is_recurring: bool,
    /// The goal this transaction feeds when marked paid.
    pub goal_id: Option<GoalId>,
}

impl TransactionBuilder {
    /// Set the budget category.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the paid status.
    pub fn status(mut self, status: PaidStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the budget bucket.
    pub fn classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    /// Mark the transaction as an instance of a fixed rule.
    pub fn recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = is_recurring;
        self
    }

    /// Link the transaction to a goal.
    pub fn goal_id(mut self, goal_id: Option<GoalId>) -> Self {
        self.goal_id = goal_id;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidGoal] if the builder's goal ID does not refer to a real
///   goal,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let year_month = MonthKey::from_date(builder.date);

    connection
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, date, year_month, category, kind, description, amount,
                 status, classification, is_recurring, goal_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             RETURNING id, user_id, date, year_month, category, kind, description,
                 amount, status, classification, is_recurring, goal_id",
        )?
        .query_row(
            (
                builder.user_id.as_i64(),
                builder.date,
                year_month,
                &builder.category,
                builder.kind,
                &builder.description,
                builder.amount,
                builder.status,
                builder.classification,
                builder.is_recurring,
                builder.goal_id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidGoal(builder.goal_id),
            error => error.into(),
        })
}

/// Retrieve a transaction owned by `user_id` by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by the
///   user,
/// - [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, date, year_month, category, kind, description,
                amount, status, classification, is_recurring, goal_id
             FROM \"transaction\"
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a user's transactions for one month, oldest first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_transactions_for_month(
    user_id: UserId,
    month: MonthKey,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, date, year_month, category, kind, description,
                amount, status, classification, is_recurring, goal_id
             FROM \"transaction\"
             WHERE user_id = :user_id AND year_month = :year_month
             ORDER BY date ASC, id ASC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64() as &dyn ToSql),
                (":year_month", &month),
            ],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the editable fields of a transaction.
///
/// The month bucket is recomputed from the transaction's date.
///
/// # Errors
/// This function will return an [Error::UpdateMissingTransaction] if the
/// transaction does not exist, or an [Error::SqlError] for other SQL errors.
pub fn update_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    let year_month = MonthKey::from_date(transaction.date);

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET date = ?1, year_month = ?2, category = ?3, kind = ?4, description = ?5,
             amount = ?6, classification = ?7
         WHERE id = ?8 AND user_id = ?9",
        (
            transaction.date,
            year_month,
            &transaction.category,
            transaction.kind,
            &transaction.description,
            transaction.amount,
            transaction.classification,
            transaction.id,
            transaction.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Set the paid status of a transaction.
///
/// # Errors
/// This function will return an [Error::UpdateMissingTransaction] if the
/// transaction does not exist, or an [Error::SqlError] for other SQL errors.
pub fn set_paid_status(
    id: TransactionId,
    user_id: UserId,
    status: PaidStatus,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET status = ?1 WHERE id = ?2 AND user_id = ?3",
        (status, id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
/// This function will return an [Error::DeleteMissingTransaction] if the
/// transaction does not exist, or an [Error::SqlError] for other SQL errors.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                year_month TEXT NOT NULL,
                category TEXT NOT NULL,
                kind TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                status TEXT NOT NULL,
                classification TEXT NOT NULL,
                is_recurring INTEGER NOT NULL DEFAULT 0,
                goal_id INTEGER,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY(goal_id) REFERENCES goal(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Used by the dashboard and the reconciler, which always read one
    // user-month at a time.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_month
         ON \"transaction\"(user_id, year_month);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        date: row.get(2)?,
        year_month: row.get(3)?,
        category: row.get(4)?,
        kind: row.get(5)?,
        description: row.get(6)?,
        amount: row.get(7)?,
        status: row.get(8)?,
        classification: row.get(9)?,
        is_recurring: row.get(10)?,
        goal_id: row.get(11)?,
    })
}

#[cfg(test)]
pub(crate) fn count_transactions(
    user_id: UserId,
    connection: &Connection,
) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod transaction_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        month::MonthKey,
        user::UserId,
    };

    use super::{
        Classification, PaidStatus, Transaction, TransactionKind, count_transactions,
        create_transaction, delete_transaction, get_transaction, get_transactions_for_month,
        set_paid_status, update_transaction,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn test_user_id(connection: &Connection) -> UserId {
        use crate::{auth::PasswordHash, user::create_user};

        create_user("test", PasswordHash::new_unchecked("hunter2"), connection)
            .unwrap()
            .id
    }

    #[test]
    fn expense_amounts_are_stored_negative() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let transaction = create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                100.0,
                date!(2024 - 03 - 05),
                "Aluguel",
            ),
            &connection,
        )
        .unwrap();

        assert_eq!(transaction.amount, -100.0);
        assert_eq!(transaction.kind, TransactionKind::Expense);
    }

    #[test]
    fn income_amounts_are_stored_positive() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let transaction = create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Income,
                -100.0,
                date!(2024 - 03 - 05),
                "Salário",
            ),
            &connection,
        )
        .unwrap();

        assert_eq!(transaction.amount, 100.0);
    }

    #[test]
    fn month_bucket_is_derived_from_date() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let transaction = create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                50.0,
                date!(2024 - 03 - 15),
                "Mercado",
            ),
            &connection,
        )
        .unwrap();

        assert_eq!(transaction.year_month, MonthKey::parse("2024-03").unwrap());
    }

    #[test]
    fn create_fails_on_invalid_goal_id() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        let goal_id = Some(42);

        let result = create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                50.0,
                date!(2024 - 03 - 15),
                "Parcela",
            )
            .goal_id(goal_id),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidGoal(goal_id)));
    }

    #[test]
    fn get_transactions_for_month_filters_by_month_and_user() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let in_march = create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                50.0,
                date!(2024 - 03 - 15),
                "Mercado",
            ),
            &connection,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                50.0,
                date!(2024 - 04 - 15),
                "Mercado",
            ),
            &connection,
        )
        .unwrap();

        let march = MonthKey::parse("2024-03").unwrap();
        let transactions = get_transactions_for_month(user_id, march, &connection).unwrap();

        assert_eq!(transactions, vec![in_march]);
    }

    #[test]
    fn transactions_are_scoped_to_their_user() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);
        let other_user_id = {
            use crate::{auth::PasswordHash, user::create_user};
            create_user("other", PasswordHash::new_unchecked("hunter2"), &connection)
                .unwrap()
                .id
        };

        let transaction = create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                50.0,
                date!(2024 - 03 - 15),
                "Mercado",
            ),
            &connection,
        )
        .unwrap();

        let result = get_transaction(transaction.id, other_user_id, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn set_paid_status_persists() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let transaction = create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                50.0,
                date!(2024 - 03 - 15),
                "Mercado",
            ),
            &connection,
        )
        .unwrap();
        assert_eq!(transaction.status, PaidStatus::Pending);

        set_paid_status(transaction.id, user_id, PaidStatus::Paid, &connection).unwrap();

        let got = get_transaction(transaction.id, user_id, &connection).unwrap();
        assert_eq!(got.status, PaidStatus::Paid);
    }

    #[test]
    fn update_transaction_moves_month_bucket() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let mut transaction = create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                50.0,
                date!(2024 - 03 - 15),
                "Mercado",
            ),
            &connection,
        )
        .unwrap();

        transaction.date = date!(2024 - 04 - 02);
        transaction.classification = Classification::Lifestyle;
        update_transaction(&transaction, &connection).unwrap();

        let got = get_transaction(transaction.id, user_id, &connection).unwrap();
        assert_eq!(got.year_month, MonthKey::parse("2024-04").unwrap());
        assert_eq!(got.classification, Classification::Lifestyle);
    }

    #[test]
    fn delete_missing_transaction_returns_error() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let result = delete_transaction(999, user_id, &connection);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn delete_removes_the_row() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let transaction = create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                50.0,
                date!(2024 - 03 - 15),
                "Mercado",
            ),
            &connection,
        )
        .unwrap();

        delete_transaction(transaction.id, user_id, &connection).unwrap();

        assert_eq!(count_transactions(user_id, &connection), Ok(0));
    }
}
