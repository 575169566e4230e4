//! The log-in page and the route handler for log-in requests.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    auth::cookie::set_auth_cookie,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base},
    user::get_user_by_username,
};

/// The form data for logging in.
#[derive(Debug, Deserialize)]
pub struct LogInFormData {
    /// The name the user registered with.
    pub username: String,
    /// The user's plain-text password, verified against the stored hash.
    pub password: String,
}

/// Route handler for the log-in page.
pub async fn get_log_in_page() -> Response {
    log_in_view("").into_response()
}

/// Route handler for log-in requests.
///
/// On success, sets the auth cookies and redirects to the dashboard.
pub async fn post_log_in(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInFormData>,
) -> Response {
    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_user_by_username(form.username.trim(), &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                return invalid_credentials_response();
            }
            Err(error) => {
                tracing::error!("could not look up user: {error}");
                return error.into_response();
            }
        }
    };

    match user.password_hash.verify(&form.password) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials_response(),
        Err(error) => {
            tracing::error!("could not verify password: {error}");
            return Error::HashingError(error.to_string()).into_response();
        }
    }

    let jar = match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("could not set auth cookie: {error}");
            return error.into_response();
        }
    };

    (
        jar,
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn invalid_credentials_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        log_in_view("Usuário ou senha inválidos."),
    )
        .into_response()
}

fn log_in_view(error_message: &str) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-6 text-2xl font-semibold" { "Entrar" }

            form
                hx-post=(endpoints::LOG_IN_API)
                hx-target="body"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="username" class=(FORM_LABEL_STYLE) { "Usuário" }

                    input
                        id="username"
                        type="text"
                        name="username"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="password" class=(FORM_LABEL_STYLE) { "Senha" }

                    input
                        id="password"
                        type="password"
                        name="password"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                @if !error_message.is_empty() {
                    p class="text-red-600 dark:text-red-400" { (error_message) }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Entrar" }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Não tem uma conta? "
                    a href=(endpoints::REGISTER_VIEW) class="text-blue-600 underline" { "Registre-se" }
                }
            }
        }
    };

    base("Entrar", &content)
}
