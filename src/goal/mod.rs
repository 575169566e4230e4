//! Goals: savings targets and debt payoffs fed by paid transactions.

mod add_value;
mod create;
mod db;
mod delete;
mod ledger;
mod list;
mod models;

pub use add_value::add_goal_value_endpoint;
pub use create::{create_goal_endpoint, get_new_goal_page};
pub use db::{
    create_goal, create_goal_table, delete_goal, get_goal, get_goal_by_linked_rule, get_goals,
    update_goal_progress,
};
pub use delete::delete_goal_endpoint;
pub use ledger::{LedgerUpdate, PaymentKind, apply_status_change, classify_payment};
pub use list::get_goals_page;
pub use models::{Goal, GoalBuilder, GoalState, GoalType};
