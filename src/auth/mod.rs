//! User authentication: password hashing, cookie sessions, middleware, and
//! the log-in, log-out, and registration routes.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use register::{get_register_page, register_user};
