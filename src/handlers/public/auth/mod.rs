mod login;
mod register;

pub use login::login_post;
pub use register::register_post;

use serde::Serialize;

use crate::database::models::user::User;

/// Token plus the account it was issued for, returned by login and register
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}
