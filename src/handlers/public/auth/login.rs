// POST /api/auth/login - authenticate and receive a JWT

use axum::response::Json;
use serde::Deserialize;

use super::AuthResponse;
use crate::auth::{generate_jwt, Claims};
use crate::database::manager::DatabaseManager;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::user_service::UserService;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login_post(Json(payload): Json<LoginRequest>) -> ApiResult<AuthResponse> {
    let pool = DatabaseManager::main_pool().await?;
    let users = UserService::new(pool);

    let user = users.verify_credentials(&payload.email, &payload.password).await?;
    let token = generate_jwt(Claims::new(&user))?;

    Ok(ApiResponse::success(AuthResponse { token, user }))
}
