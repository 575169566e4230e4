//! Contas is a web app for tracking personal finances: monthly income and
//! expense entries, recurring ("fixed") rules that regenerate them each
//! month, and savings or debt-payoff goals fed by paid transactions.
//!
//! This library provides a server that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod goal;
mod html;
mod internal_server_error;
mod month;
mod navigation;
mod not_found;
mod report;
mod routing;
mod rule;
mod transaction;
mod user;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use month::MonthKey;
pub use routing::build_router;
pub use user::{User, UserId};

use crate::{
    alert::Alert,
    database_id::{GoalId, RuleId},
    internal_server_error::{InternalServerErrorPageTemplate, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server
    /// error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The chosen username already exists in the database.
    #[error("the username is already taken")]
    DuplicateUsername,

    /// A month string was not in the `YYYY-MM` format.
    ///
    /// Month-scoped operations (the dashboard, fixed-entry generation) take
    /// the target month as a string and must reject anything unparsable
    /// before touching the database.
    #[error("\"{0}\" is not a valid YYYY-MM month")]
    InvalidMonth(String),

    /// A fixed rule was given a day outside 1-31.
    #[error("{0} is not a valid day of the month")]
    InvalidDayOfMonth(i64),

    /// A fixed rule or goal was given a zero or negative amount.
    ///
    /// Rule and goal amounts are magnitudes; the sign of a generated
    /// transaction is derived from its kind.
    #[error("{0} is not a valid amount, expected a positive value")]
    InvalidAmount(f64),

    /// The goal ID used to create a transaction did not match a valid goal.
    #[error("the goal ID {0:?} does not refer to a valid goal")]
    InvalidGoal(Option<GoalId>),

    /// The rule ID used to link a goal did not match a valid fixed rule.
    #[error("the rule ID {0:?} does not refer to a valid fixed rule")]
    InvalidRuleLink(Option<RuleId>),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the
    /// parameters (e.g., ID) are correct and that the resource has been
    /// created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to update a fixed rule that does not exist
    #[error("tried to update a fixed rule that is not in the database")]
    UpdateMissingRule,

    /// Tried to delete a fixed rule that does not exist
    #[error("tried to delete a fixed rule that is not in the database")]
    DeleteMissingRule,

    /// Tried to update a goal that does not exist
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to delete a goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidMonth(month) => render_internal_server_error(
                InternalServerErrorPageTemplate {
                    description: "Mês inválido",
                    fix: &format!("\"{month}\" não é um mês no formato AAAA-MM."),
                },
                StatusCode::BAD_REQUEST,
            ),
            Error::DatabaseLockError => render_internal_server_error(
                Default::default(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(
                    Default::default(),
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        let status_code = match &self {
            Error::InvalidMonth(_)
            | Error::InvalidDayOfMonth(_)
            | Error::InvalidAmount(_)
            | Error::InvalidGoal(_)
            | Error::InvalidRuleLink(_) => StatusCode::BAD_REQUEST,
            Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingRule
            | Error::DeleteMissingRule
            | Error::UpdateMissingGoal
            | Error::DeleteMissingGoal => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let alert = match self {
            Error::InvalidMonth(month) => Alert::error(
                "Mês inválido",
                &format!("\"{month}\" não é um mês no formato AAAA-MM."),
            ),
            Error::InvalidDayOfMonth(day) => Alert::error(
                "Dia inválido",
                &format!("{day} não é um dia válido, use um valor entre 1 e 31."),
            ),
            Error::InvalidAmount(amount) => Alert::error(
                "Valor inválido",
                &format!("{amount} não é um valor válido, use um número positivo."),
            ),
            Error::InvalidGoal(goal_id) => Alert::error(
                "Meta inválida",
                &format!("Não existe meta com o ID {goal_id:?}."),
            ),
            Error::InvalidRuleLink(rule_id) => Alert::error(
                "Lançamento fixo inválido",
                &format!("Não existe lançamento fixo com o ID {rule_id:?}."),
            ),
            Error::UpdateMissingTransaction => Alert::error(
                "Não foi possível atualizar o lançamento",
                "O lançamento não foi encontrado.",
            ),
            Error::DeleteMissingTransaction => Alert::error(
                "Não foi possível excluir o lançamento",
                "O lançamento não foi encontrado. \
                Atualize a página para ver se ele já foi excluído.",
            ),
            Error::UpdateMissingRule => Alert::error(
                "Não foi possível atualizar o lançamento fixo",
                "O lançamento fixo não foi encontrado.",
            ),
            Error::DeleteMissingRule => Alert::error(
                "Não foi possível excluir o lançamento fixo",
                "O lançamento fixo não foi encontrado. \
                Atualize a página para ver se ele já foi excluído.",
            ),
            Error::UpdateMissingGoal => Alert::error(
                "Não foi possível atualizar a meta",
                "A meta não foi encontrada.",
            ),
            Error::DeleteMissingGoal => Alert::error(
                "Não foi possível excluir a meta",
                "A meta não foi encontrada. \
                Atualize a página para ver se ela já foi excluída.",
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                Alert::error(
                    "Algo deu errado",
                    "Ocorreu um erro inesperado, verifique os logs do servidor.",
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
