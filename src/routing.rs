//! Application router configuration with protected and unprotected route
//! definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    dashboard::get_dashboard_page,
    endpoints,
    goal::{
        add_goal_value_endpoint, create_goal_endpoint, delete_goal_endpoint, get_goals_page,
        get_new_goal_page,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    report::get_annual_report_page,
    rule::{
        create_rule_endpoint, delete_rule_endpoint, generate_fixed_endpoint, get_edit_rule_page,
        get_new_rule_page, get_rules_page, update_rule_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_edit_transaction_page,
        get_new_transaction_page, toggle_transaction_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::RULES_VIEW, get(get_rules_page))
        .route(endpoints::NEW_RULE_VIEW, get(get_new_rule_page))
        .route(endpoints::EDIT_RULE_VIEW, get(get_edit_rule_page))
        .route(endpoints::GOALS_VIEW, get(get_goals_page))
        .route(endpoints::NEW_GOAL_VIEW, get(get_new_goal_page))
        .route(endpoints::ANNUAL_REPORT_VIEW, get(get_annual_report_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-Redirect header for
    // auth redirects to work properly for htmx requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(endpoints::PUT_TRANSACTION, put(update_transaction_endpoint))
            .route(
                endpoints::DELETE_TRANSACTION,
                delete(delete_transaction_endpoint),
            )
            .route(
                endpoints::TOGGLE_TRANSACTION,
                post(toggle_transaction_endpoint),
            )
            .route(endpoints::POST_RULE, post(create_rule_endpoint))
            .route(endpoints::PUT_RULE, put(update_rule_endpoint))
            .route(endpoints::DELETE_RULE, delete(delete_rule_endpoint))
            .route(endpoints::GENERATE_FIXED, post(generate_fixed_endpoint))
            .route(endpoints::POST_GOAL, post(create_goal_endpoint))
            .route(endpoints::DELETE_GOAL, delete(delete_goal_endpoint))
            .route(endpoints::ADD_GOAL_VALUE, post(add_goal_value_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod routing_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints};

    use super::build_router;

    fn test_server() -> TestServer {
        let state = AppState::new(Connection::open_in_memory().unwrap(), "42").unwrap();

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn root_redirects_unauthenticated_clients_to_log_in() {
        let server = test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN_VIEW);
    }

    #[tokio::test]
    async fn log_in_page_is_reachable_without_a_session() {
        let server = test_server();

        let response = server.get(endpoints::LOG_IN_VIEW).await;

        response.assert_status_ok();
        assert!(response.text().contains("Entrar"));
    }

    #[tokio::test]
    async fn dashboard_requires_a_session() {
        let server = test_server();

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status_see_other();
    }

    #[tokio::test]
    async fn unknown_routes_fall_back_to_not_found() {
        let server = test_server();

        let response = server.get("/definitely/not/a/route").await;

        response.assert_status_not_found();
    }
}