// /api/projects handlers - project lifecycle over ProjectService

use axum::extract::{Path, Query};
use axum::response::Json;
use axum::Extension;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::page::{Page, PageParams};
use crate::database::manager::DatabaseManager;
use crate::database::models::project::Project;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::project_service::{ProjectInput, ProjectService};

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    pub description: String,
    pub budget: BigDecimal,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

impl From<ProjectRequest> for ProjectInput {
    fn from(request: ProjectRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            budget: request.budget,
            deadline: request.deadline,
            required_skills: request.required_skills,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SkillQuery {
    pub skill: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SkillsQuery {
    /// Comma-separated skill list, e.g. ?skills=go,rust
    pub skills: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

async fn service() -> Result<ProjectService, ApiError> {
    let pool = DatabaseManager::main_pool().await?;
    Ok(ProjectService::new(pool))
}

/// POST /api/projects - create a project owned by the caller
pub async fn project_post(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ProjectRequest>,
) -> ApiResult<Project> {
    let project = service().await?.create(payload.into(), auth.user_id).await?;
    Ok(ApiResponse::created(project))
}

/// GET /api/projects - page of OPEN projects
pub async fn projects_get(Query(params): Query<PageParams>) -> ApiResult<Page<Project>> {
    let page = service().await?.get_open(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/projects/client - the caller's own projects, any status
pub async fn client_projects_get(
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<PageParams>,
) -> ApiResult<Page<Project>> {
    let page = service().await?.get_by_client(auth.user_id, &params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/projects/search/skill?skill= - OPEN projects requiring a skill
pub async fn search_by_skill_get(Query(query): Query<SkillQuery>) -> ApiResult<Page<Project>> {
    let params = PageParams::new(query.page, query.size);
    let page = service().await?.get_by_skill(query.skill, &params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/projects/search/skills?skills=a,b - OPEN projects matching any skill
pub async fn search_by_skills_get(Query(query): Query<SkillsQuery>) -> ApiResult<Page<Project>> {
    let params = PageParams::new(query.page, query.size);
    let skills = parse_skills(query.skills.as_deref());
    let page = service().await?.get_by_skills(skills, &params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/projects/:project_id
pub async fn project_get(Path(project_id): Path<Uuid>) -> ApiResult<Project> {
    let project = service()
        .await?
        .get_by_id(project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    Ok(ApiResponse::success(project))
}

/// PUT /api/projects/:project_id - owner-only field overwrite
pub async fn project_put(
    Path(project_id): Path<Uuid>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ProjectRequest>,
) -> ApiResult<Project> {
    let project = service()
        .await?
        .update(project_id, payload.into(), auth.user_id)
        .await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/projects/:project_id - owner-only cascade delete
pub async fn project_delete(
    Path(project_id): Path<Uuid>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<()> {
    service().await?.delete(project_id, auth.user_id).await?;
    Ok(ApiResponse::<()>::no_content())
}

fn parse_skills(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
