//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/lancamentos/{transaction_id}/edit',
//! use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users: one month of transactions.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/lancamentos/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/lancamentos/{transaction_id}/edit";
/// The page for listing all fixed rules.
pub const RULES_VIEW: &str = "/fixos";
/// The page for creating a new fixed rule.
pub const NEW_RULE_VIEW: &str = "/fixos/new";
/// The page for editing an existing fixed rule.
pub const EDIT_RULE_VIEW: &str = "/fixos/{rule_id}/edit";
/// The page for listing all goals.
pub const GOALS_VIEW: &str = "/metas";
/// The page for creating a new goal.
pub const NEW_GOAL_VIEW: &str = "/metas/new";
/// The annual report page.
pub const ANNUAL_REPORT_VIEW: &str = "/relatorio/{year}";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register a user.
pub const USERS: &str = "/api/users";
/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/lancamentos";
/// The route to update a transaction.
pub const PUT_TRANSACTION: &str = "/api/lancamentos/{transaction_id}";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/api/lancamentos/{transaction_id}";
/// The route to toggle a transaction between pending and paid.
pub const TOGGLE_TRANSACTION: &str = "/api/lancamentos/{transaction_id}/toggle";
/// The route to create a fixed rule.
pub const POST_RULE: &str = "/api/fixos";
/// The route to update a fixed rule.
pub const PUT_RULE: &str = "/api/fixos/{rule_id}";
/// The route to delete a fixed rule.
pub const DELETE_RULE: &str = "/api/fixos/{rule_id}";
/// The route to (re)generate fixed entries for a month.
pub const GENERATE_FIXED: &str = "/api/fixos/generate";
/// The route to create a goal.
pub const POST_GOAL: &str = "/api/metas";
/// The route to delete a goal.
pub const DELETE_GOAL: &str = "/api/metas/{goal_id}";
/// The route to add a manual amount to a goal.
pub const ADD_GOAL_VALUE: &str = "/api/metas/{goal_id}/add";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/metas/{goal_id}', '{goal_id}' is the
/// parameter.
///
/// This function assumes that an endpoint path only contains ASCII
/// characters and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let Some(param_end) = endpoint_path[param_start..].find('}') else {
        return endpoint_path.to_owned();
    };

    let mut formatted = String::with_capacity(endpoint_path.len());
    formatted.push_str(&endpoint_path[..param_start]);
    formatted.push_str(&id.to_string());
    formatted.push_str(&endpoint_path[param_start + param_end + 1..]);

    formatted
}

#[cfg(test)]
mod endpoints_tests {
    use super::{DELETE_GOAL, TOGGLE_TRANSACTION, format_endpoint};

    #[test]
    fn formats_single_parameter() {
        assert_eq!(format_endpoint(DELETE_GOAL, 42), "/api/metas/42");
    }

    #[test]
    fn formats_parameter_in_the_middle() {
        assert_eq!(
            format_endpoint(TOGGLE_TRANSACTION, 7),
            "/api/lancamentos/7/toggle"
        );
    }

    #[test]
    fn returns_path_unchanged_without_parameter() {
        assert_eq!(format_endpoint("/api/metas", 1), "/api/metas");
    }
}
