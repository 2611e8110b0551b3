// POST /api/auth/register - create an account and receive a JWT

use axum::response::Json;
use serde::Deserialize;

use super::AuthResponse;
use crate::auth::{generate_jwt, Claims};
use crate::database::manager::DatabaseManager;
use crate::database::models::user::UserRole;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::user_service::{NewUser, UserService};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

pub async fn register_post(Json(payload): Json<RegisterRequest>) -> ApiResult<AuthResponse> {
    let pool = DatabaseManager::main_pool().await?;
    let users = UserService::new(pool);

    let user = users
        .register(NewUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role: payload.role,
        })
        .await?;

    let token = generate_jwt(Claims::new(&user))?;

    Ok(ApiResponse::created(AuthResponse { token, user }))
}
