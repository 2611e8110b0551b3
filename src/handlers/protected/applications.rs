// /api/applications handlers - application lifecycle over ApplicationService

use axum::extract::{Path, Query};
use axum::response::Json;
use axum::Extension;
use bigdecimal::BigDecimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::page::{Page, PageParams};
use crate::database::manager::DatabaseManager;
use crate::database::models::application::{Application, ApplicationStatus};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::application_service::{ApplicationService, NewApplication};

#[derive(Debug, Deserialize)]
pub struct ApplicationRequest {
    pub project_id: Uuid,
    pub proposal_message: String,
    pub expected_price: BigDecimal,
    pub portfolio_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: ApplicationStatus,
}

async fn service() -> Result<ApplicationService, ApiError> {
    let pool = DatabaseManager::main_pool().await?;
    Ok(ApplicationService::new(pool))
}

/// POST /api/applications - apply to a project as the caller
pub async fn application_post(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ApplicationRequest>,
) -> ApiResult<Application> {
    let application = service()
        .await?
        .create(
            NewApplication {
                project_id: payload.project_id,
                proposal_message: payload.proposal_message,
                expected_price: payload.expected_price,
                portfolio_link: payload.portfolio_link,
            },
            auth.user_id,
        )
        .await?;
    Ok(ApiResponse::created(application))
}

/// GET /api/applications/project/:project_id - applications for a project
pub async fn project_applications_get(
    Path(project_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ApiResult<Page<Application>> {
    let page = service().await?.list_by_project(project_id, &params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/applications/project/:project_id/status/:status - full list in one status
pub async fn project_applications_by_status_get(
    Path((project_id, status)): Path<(Uuid, ApplicationStatus)>,
) -> ApiResult<Vec<Application>> {
    let applications = service()
        .await?
        .list_by_project_and_status(project_id, status)
        .await?;
    Ok(ApiResponse::success(applications))
}

/// GET /api/applications/freelancer - the caller's own applications
pub async fn freelancer_applications_get(
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<PageParams>,
) -> ApiResult<Page<Application>> {
    let page = service().await?.list_by_freelancer(auth.user_id, &params).await?;
    Ok(ApiResponse::success(page))
}

/// PUT /api/applications/:application_id/status?status= - overwrite status
pub async fn application_status_put(
    Path(application_id): Path<Uuid>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Application> {
    let application = service().await?.update_status(application_id, query.status).await?;
    Ok(ApiResponse::success(application))
}

/// GET /api/applications/:application_id
pub async fn application_get(Path(application_id): Path<Uuid>) -> ApiResult<Application> {
    let application = service()
        .await?
        .get_by_id(application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;
    Ok(ApiResponse::success(application))
}

/// GET /api/applications/check/:project_id - has the caller applied?
pub async fn check_applied_get(
    Path(project_id): Path<Uuid>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<bool> {
    let has_applied = service()
        .await?
        .exists_for_project_and_freelancer(project_id, auth.user_id)
        .await?;
    Ok(ApiResponse::success(has_applied))
}
