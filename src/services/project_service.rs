use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::page::{Page, PageParams};
use crate::database::models::project::{Project, ProjectRow, ProjectStatus};

const PROJECT_COLUMNS: &str = "id, name, description, budget, deadline, status, client_id, created_at";

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Fields a client supplies when creating or updating a project.
/// Status is deliberately absent: it is never set through this path.
#[derive(Debug, Clone)]
pub struct ProjectInput {
    pub name: String,
    pub description: String,
    pub budget: BigDecimal,
    pub deadline: NaiveDate,
    pub required_skills: Vec<String>,
}

/// Project lifecycle: creation, queries, owner-guarded mutation, and
/// transactional cascade deletion of dependent applications.
pub struct ProjectService {
    pool: PgPool,
}

impl ProjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a project owned by `client_id`, status OPEN
    pub async fn create(&self, input: ProjectInput, client_id: Uuid) -> Result<Project, ProjectError> {
        validate_input(&input)?;
        self.ensure_user_exists(client_id, "Client").await?;

        let mut tx = self.pool.begin().await?;

        let query = format!(
            "INSERT INTO projects (id, name, description, budget, deadline, status, client_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PROJECT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.budget)
            .bind(input.deadline)
            .bind(ProjectStatus::Open)
            .bind(client_id)
            .fetch_one(&mut *tx)
            .await?;

        insert_skills(&mut tx, row.id, &input.required_skills).await?;

        tx.commit().await?;

        tracing::info!("Client {} created project {}", client_id, row.id);
        Ok(Project::from_parts(row, input.required_skills))
    }

    /// Page of OPEN projects in insertion order
    pub async fn get_open(&self, params: &PageParams) -> Result<Page<Project>, ProjectError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE status = $1")
            .bind(ProjectStatus::Open)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE status = $1 \
             ORDER BY created_at, id LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(ProjectStatus::Open)
            .bind(params.size())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let projects = self.attach_skills(rows).await?;
        Ok(Page::new(projects, params, total))
    }

    /// OPEN projects requiring `skill` (case-sensitive exact match).
    /// An absent skill behaves exactly like [`Self::get_open`].
    pub async fn get_by_skill(
        &self,
        skill: Option<String>,
        params: &PageParams,
    ) -> Result<Page<Project>, ProjectError> {
        let skill = match skill.filter(|s| !s.is_empty()) {
            Some(skill) => skill,
            None => return self.get_open(params).await,
        };

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM projects \
             WHERE status = $1 AND EXISTS ( \
                 SELECT 1 FROM project_skills ps \
                 WHERE ps.project_id = projects.id AND ps.skill = $2)",
        )
        .bind(ProjectStatus::Open)
        .bind(&skill)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects \
             WHERE status = $1 AND EXISTS ( \
                 SELECT 1 FROM project_skills ps \
                 WHERE ps.project_id = projects.id AND ps.skill = $2) \
             ORDER BY created_at, id LIMIT $3 OFFSET $4"
        );

        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(ProjectStatus::Open)
            .bind(&skill)
            .bind(params.size())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let projects = self.attach_skills(rows).await?;
        Ok(Page::new(projects, params, total))
    }

    /// OPEN projects whose skills intersect `skills` (logical OR).
    /// An empty set behaves exactly like [`Self::get_open`].
    pub async fn get_by_skills(
        &self,
        skills: Vec<String>,
        params: &PageParams,
    ) -> Result<Page<Project>, ProjectError> {
        if skills.is_empty() {
            return self.get_open(params).await;
        }

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM projects \
             WHERE status = $1 AND EXISTS ( \
                 SELECT 1 FROM project_skills ps \
                 WHERE ps.project_id = projects.id AND ps.skill = ANY($2))",
        )
        .bind(ProjectStatus::Open)
        .bind(&skills)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects \
             WHERE status = $1 AND EXISTS ( \
                 SELECT 1 FROM project_skills ps \
                 WHERE ps.project_id = projects.id AND ps.skill = ANY($2)) \
             ORDER BY created_at, id LIMIT $3 OFFSET $4"
        );

        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(ProjectStatus::Open)
            .bind(&skills)
            .bind(params.size())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let projects = self.attach_skills(rows).await?;
        Ok(Page::new(projects, params, total))
    }

    /// All projects (any status) owned by `client_id`
    pub async fn get_by_client(
        &self,
        client_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<Project>, ProjectError> {
        self.ensure_user_exists(client_id, "Client").await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE client_id = $1")
            .bind(client_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE client_id = $1 \
             ORDER BY created_at, id LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(client_id)
            .bind(params.size())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let projects = self.attach_skills(rows).await?;
        Ok(Page::new(projects, params, total))
    }

    /// Single project lookup; `None` rather than an error at this boundary
    pub async fn get_by_id(&self, project_id: Uuid) -> Result<Option<Project>, ProjectError> {
        let row = match self.fetch_row(project_id).await? {
            Some(row) => row,
            None => return Ok(None),
        };

        let skills = self.load_skills(&[row.id]).await?.remove(&row.id).unwrap_or_default();
        Ok(Some(Project::from_parts(row, skills)))
    }

    /// Overwrite a project's mutable fields. Ownership is checked before
    /// field validation, so a non-owner always sees PermissionDenied.
    pub async fn update(
        &self,
        project_id: Uuid,
        input: ProjectInput,
        caller_id: Uuid,
    ) -> Result<Project, ProjectError> {
        let existing = self
            .fetch_row(project_id)
            .await?
            .ok_or_else(|| ProjectError::NotFound(format!("Project not found with id: {project_id}")))?;

        if existing.client_id != caller_id {
            return Err(ProjectError::PermissionDenied(
                "You do not have permission to update this project".to_string(),
            ));
        }

        validate_input(&input)?;

        let mut tx = self.pool.begin().await?;

        let query = format!(
            "UPDATE projects SET name = $1, description = $2, budget = $3, deadline = $4 \
             WHERE id = $5 \
             RETURNING {PROJECT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.budget)
            .bind(input.deadline)
            .bind(project_id)
            .fetch_one(&mut *tx)
            .await?;

        // Skills are replaced wholesale
        sqlx::query("DELETE FROM project_skills WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
        insert_skills(&mut tx, project_id, &input.required_skills).await?;

        tx.commit().await?;

        Ok(Project::from_parts(row, input.required_skills))
    }

    /// Delete a project and everything it owns. Applications, skills rows,
    /// and the project itself go in one transaction: all or nothing.
    pub async fn delete(&self, project_id: Uuid, caller_id: Uuid) -> Result<(), ProjectError> {
        let existing = self
            .fetch_row(project_id)
            .await?
            .ok_or_else(|| ProjectError::NotFound(format!("Project not found with id: {project_id}")))?;

        if existing.client_id != caller_id {
            return Err(ProjectError::PermissionDenied(
                "You do not have permission to delete this project".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM applications WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM project_skills WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Client {} deleted project {} and its applications", caller_id, project_id);
        Ok(())
    }

    async fn fetch_row(&self, project_id: Uuid) -> Result<Option<ProjectRow>, ProjectError> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn ensure_user_exists(&self, user_id: Uuid, label: &str) -> Result<(), ProjectError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(ProjectError::NotFound(format!("{label} not found"))),
        }
    }

    /// Load skills for a set of projects in insertion order
    async fn load_skills(&self, project_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<String>>, ProjectError> {
        if project_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT project_id, skill FROM project_skills \
             WHERE project_id = ANY($1) ORDER BY project_id, position",
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_project: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (project_id, skill) in rows {
            by_project.entry(project_id).or_default().push(skill);
        }
        Ok(by_project)
    }

    async fn attach_skills(&self, rows: Vec<ProjectRow>) -> Result<Vec<Project>, ProjectError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut skills = self.load_skills(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let project_skills = skills.remove(&row.id).unwrap_or_default();
                Project::from_parts(row, project_skills)
            })
            .collect())
    }
}

async fn insert_skills(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    project_id: Uuid,
    skills: &[String],
) -> Result<(), sqlx::Error> {
    // Position column preserves list order; duplicates are kept as given
    for (position, skill) in skills.iter().enumerate() {
        sqlx::query("INSERT INTO project_skills (project_id, position, skill) VALUES ($1, $2, $3)")
            .bind(project_id)
            .bind(position as i32)
            .bind(skill)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

fn validate_input(input: &ProjectInput) -> Result<(), ProjectError> {
    if input.name.trim().is_empty() {
        return Err(ProjectError::Validation("Project name is required".to_string()));
    }
    if input.description.trim().is_empty() {
        return Err(ProjectError::Validation("Project description is required".to_string()));
    }
    if input.budget <= BigDecimal::zero() {
        return Err(ProjectError::Validation("Budget must be positive".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn valid_input() -> ProjectInput {
        ProjectInput {
            name: "Build a website".to_string(),
            description: "A storefront with checkout".to_string(),
            budget: BigDecimal::from(1000),
            deadline: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            required_skills: vec!["go".to_string(), "rust".to_string()],
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(validate_input(&valid_input()).is_ok());
    }

    #[test]
    fn rejects_blank_name_and_description() {
        let input = ProjectInput { name: " ".to_string(), ..valid_input() };
        assert!(matches!(validate_input(&input), Err(ProjectError::Validation(_))));

        let input = ProjectInput { description: String::new(), ..valid_input() };
        assert!(matches!(validate_input(&input), Err(ProjectError::Validation(_))));
    }

    #[test]
    fn rejects_non_positive_budget() {
        for budget in ["0", "-1", "-0.01"] {
            let input = ProjectInput {
                budget: BigDecimal::from_str(budget).unwrap(),
                ..valid_input()
            };
            assert!(
                matches!(validate_input(&input), Err(ProjectError::Validation(_))),
                "expected rejection for budget {budget}"
            );
        }
    }

    #[test]
    fn empty_skill_list_is_allowed() {
        let input = ProjectInput { required_skills: vec![], ..valid_input() };
        assert!(validate_input(&input).is_ok());
    }
}
