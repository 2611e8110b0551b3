// GET /api/auth/whoami - current authenticated account

use axum::Extension;

use crate::database::manager::DatabaseManager;
use crate::database::models::user::User;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::user_service::UserService;

pub async fn whoami_get(Extension(auth): Extension<AuthUser>) -> ApiResult<User> {
    let pool = DatabaseManager::main_pool().await?;
    let users = UserService::new(pool);

    // Token can outlive the account; report that as not-found
    let user = users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(user))
}
