//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The ID of a row in the transaction table.
pub type TransactionId = DatabaseId;

/// The ID of a row in the fixed_rule table.
pub type RuleId = DatabaseId;

/// The ID of a row in the goal table.
pub type GoalId = DatabaseId;
