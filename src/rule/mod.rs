//! Fixed rules: recurring monthly entries and the reconciler that turns them
//! into transactions.

mod create;
mod db;
mod delete;
mod edit;
mod generate;
mod list;
mod matching;
mod models;
mod reconcile;

pub use create::{create_rule_endpoint, get_new_rule_page};
pub use db::{create_rule, create_rule_table, get_rules};
pub use delete::delete_rule_endpoint;
pub use edit::{get_edit_rule_page, update_rule_endpoint};
pub use generate::generate_fixed_endpoint;
pub use list::get_rules_page;
pub use matching::descriptions_match;
pub use models::{FixedRule, FixedRuleBuilder, RuleState};
pub use reconcile::{create_generation_log_table, is_month_generated, reconcile};
