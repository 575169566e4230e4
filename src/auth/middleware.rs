//! Authentication middleware that validates cookies, extends sessions, and
//! redirects logged-out clients to the log-in page.

use axum::{
    extract::{FromRef, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState, endpoints,
    auth::cookie::{get_session_user_id, set_auth_cookie},
};

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware for pages: redirects to the log-in page when the session is
/// missing or expired, otherwise refreshes the session expiry and injects
/// the [crate::UserId] as a request extension.
pub async fn auth_guard(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    match run_auth_guard(state, jar, request, next).await {
        Ok(response) => response,
        Err(_) => Redirect::to(endpoints::LOG_IN_VIEW).into_response(),
    }
}

/// Middleware for htmx API endpoints: responds with an `HX-Redirect` header
/// instead of an HTTP redirect so that htmx swaps the whole page.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    match run_auth_guard(state, jar, request, next).await {
        Ok(response) => response,
        Err(_) => (
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
    }
}

async fn run_auth_guard(
    state: AuthState,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, crate::Error> {
    let user_id = get_session_user_id(&jar)?;

    // Sliding expiry: each authenticated request pushes the session end out
    // by the configured duration.
    let jar = set_auth_cookie(jar, user_id, state.cookie_duration)?;

    request.extensions_mut().insert(user_id);

    let response = next.run(request).await;

    Ok((jar, response).into_response())
}
