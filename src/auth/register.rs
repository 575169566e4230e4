//! The registration page and the route handler for creating users.

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
    auth::{cookie::set_auth_cookie, password::PasswordHash},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base},
    user::create_user,
};

/// The form data for registering a new user.
#[derive(Debug, Deserialize)]
pub struct RegisterFormData {
    /// The name the user will log in with.
    pub username: String,
    /// The chosen password.
    pub password: String,
    /// The password a second time, to catch typos.
    pub confirm_password: String,
}

/// Route handler for the registration page.
pub async fn get_register_page() -> Response {
    register_view("").into_response()
}

/// Route handler for creating a new user.
///
/// On success the new user is logged in immediately and redirected to the
/// dashboard.
pub async fn register_user(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterFormData>,
) -> Response {
    let username = form.username.trim();

    if username.is_empty() {
        return register_error_response("Informe um nome de usuário.");
    }

    if form.password != form.confirm_password {
        return register_error_response("As senhas não coincidem.");
    }

    let password_hash = match PasswordHash::from_raw_password(&form.password, PasswordHash::DEFAULT_COST)
    {
        Ok(hash) => hash,
        Err(Error::TooWeak(feedback)) => {
            return register_error_response(&format!("Senha muito fraca: {feedback}"));
        }
        Err(error) => {
            tracing::error!("could not hash password: {error}");
            return error.into_response();
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match create_user(username, password_hash, &connection) {
            Ok(user) => user,
            Err(Error::DuplicateUsername) => {
                return register_error_response("Esse nome de usuário já está em uso.");
            }
            Err(error) => {
                tracing::error!("could not create user: {error}");
                return error.into_response();
            }
        }
    };

    let jar = match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("could not set auth cookie: {error}");
            return error.into_response();
        }
    };

    tracing::info!("registered new user {}", user.username);

    (
        jar,
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn register_error_response(error_message: &str) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, register_view(error_message)).into_response()
}

fn register_view(error_message: &str) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-6 text-2xl font-semibold" { "Criar conta" }

            form
                hx-post=(endpoints::USERS)
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

                div
                {
                    label for="confirm_password" class=(FORM_LABEL_STYLE) { "Confirmar senha" }

                    input
                        id="confirm_password"
                        type="password"
                        name="confirm_password"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                @if !error_message.is_empty() {
                    p class="text-red-600 dark:text-red-400" { (error_message) }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Registrar" }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Já tem uma conta? "
                    a href=(endpoints::LOG_IN_VIEW) class="text-blue-600 underline" { "Entrar" }
                }
            }
        }
    };

    base("Criar conta", &content)
}
