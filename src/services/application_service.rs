use bigdecimal::{BigDecimal, Zero};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::page::{Page, PageParams};
use crate::database::is_unique_violation;
use crate::database::models::application::{Application, ApplicationStatus};

const APPLICATION_COLUMNS: &str =
    "id, proposal_message, expected_price, portfolio_link, status, project_id, freelancer_id, created_at";

/// Name of the unique constraint backing the one-application-per-
/// (project, freelancer) invariant; see migrations/0001_initial_schema.sql
const UNIQUE_APPLICATION_CONSTRAINT: &str = "uq_applications_project_freelancer";

#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("You have already applied to this project")]
    AlreadyApplied,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub project_id: Uuid,
    pub proposal_message: String,
    pub expected_price: BigDecimal,
    pub portfolio_link: Option<String>,
}

/// Application lifecycle: creation under the one-per-pair invariant,
/// listings, and status transitions.
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submit an application as `freelancer_id`, status PENDING.
    ///
    /// The duplicate check runs twice: a pre-check for a friendly error and
    /// the unique constraint as the race-proof backstop. A constraint
    /// violation on insert is reported as the same conflict.
    pub async fn create(
        &self,
        new_application: NewApplication,
        freelancer_id: Uuid,
    ) -> Result<Application, ApplicationError> {
        validate_new_application(&new_application)?;
        self.ensure_project_exists(new_application.project_id).await?;
        self.ensure_user_exists(freelancer_id, "Freelancer").await?;

        if self
            .exists_unchecked(new_application.project_id, freelancer_id)
            .await?
        {
            return Err(ApplicationError::AlreadyApplied);
        }

        let query = format!(
            "INSERT INTO applications \
             (id, proposal_message, expected_price, portfolio_link, status, project_id, freelancer_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {APPLICATION_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Application>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_application.proposal_message)
            .bind(&new_application.expected_price)
            .bind(&new_application.portfolio_link)
            .bind(ApplicationStatus::Pending)
            .bind(new_application.project_id)
            .bind(freelancer_id)
            .fetch_one(&self.pool)
            .await;

        match inserted {
            Ok(application) => {
                tracing::info!(
                    "Freelancer {} applied to project {}",
                    freelancer_id,
                    application.project_id
                );
                Ok(application)
            }
            Err(e) if is_unique_violation(&e, UNIQUE_APPLICATION_CONSTRAINT) => {
                Err(ApplicationError::AlreadyApplied)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Page of applications against a project
    pub async fn list_by_project(
        &self,
        project_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<Application>, ApplicationError> {
        self.ensure_project_exists(project_id).await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE project_id = $1 \
             ORDER BY created_at, id LIMIT $2 OFFSET $3"
        );

        let applications = sqlx::query_as::<_, Application>(&query)
            .bind(project_id)
            .bind(params.size())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(applications, params, total))
    }

    /// Page of applications submitted by a freelancer
    pub async fn list_by_freelancer(
        &self,
        freelancer_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<Application>, ApplicationError> {
        self.ensure_user_exists(freelancer_id, "Freelancer").await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE freelancer_id = $1")
            .bind(freelancer_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE freelancer_id = $1 \
             ORDER BY created_at, id LIMIT $2 OFFSET $3"
        );

        let applications = sqlx::query_as::<_, Application>(&query)
            .bind(freelancer_id)
            .bind(params.size())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(applications, params, total))
    }

    /// Overwrite an application's status. Any status may follow any other.
    /// No caller check here: any authenticated user can change any
    /// application's status, matching the original system's behavior.
    pub async fn update_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, ApplicationError> {
        let query = format!(
            "UPDATE applications SET status = $1 WHERE id = $2 \
             RETURNING {APPLICATION_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Application>(&query)
            .bind(status)
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or_else(|| ApplicationError::NotFound("Application not found".to_string()))
    }

    /// Single application lookup; `None` rather than an error at this boundary
    pub async fn get_by_id(&self, application_id: Uuid) -> Result<Option<Application>, ApplicationError> {
        let query = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1");
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(application)
    }

    /// "Have I applied" check, also used internally by [`Self::create`]
    pub async fn exists_for_project_and_freelancer(
        &self,
        project_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<bool, ApplicationError> {
        self.ensure_project_exists(project_id).await?;
        self.ensure_user_exists(freelancer_id, "User").await?;
        self.exists_unchecked(project_id, freelancer_id).await
    }

    /// Full (unpaginated) list of a project's applications in one status
    pub async fn list_by_project_and_status(
        &self,
        project_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Vec<Application>, ApplicationError> {
        self.ensure_project_exists(project_id).await?;

        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE project_id = $1 AND status = $2 \
             ORDER BY created_at, id"
        );

        let applications = sqlx::query_as::<_, Application>(&query)
            .bind(project_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(applications)
    }

    async fn exists_unchecked(&self, project_id: Uuid, freelancer_id: Uuid) -> Result<bool, ApplicationError> {
        let found: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM applications WHERE project_id = $1 AND freelancer_id = $2",
        )
        .bind(project_id)
        .bind(freelancer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    async fn ensure_project_exists(&self, project_id: Uuid) -> Result<(), ApplicationError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM projects WHERE id = $1")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(ApplicationError::NotFound("Project not found".to_string())),
        }
    }

    async fn ensure_user_exists(&self, user_id: Uuid, label: &str) -> Result<(), ApplicationError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(ApplicationError::NotFound(format!("{label} not found"))),
        }
    }
}

fn validate_new_application(new_application: &NewApplication) -> Result<(), ApplicationError> {
    if new_application.proposal_message.trim().is_empty() {
        return Err(ApplicationError::Validation(
            "Proposal message is required".to_string(),
        ));
    }
    if new_application.expected_price <= BigDecimal::zero() {
        return Err(ApplicationError::Validation(
            "Expected price must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn valid_application() -> NewApplication {
        NewApplication {
            project_id: Uuid::new_v4(),
            proposal_message: "I can deliver this in two weeks".to_string(),
            expected_price: BigDecimal::from(900),
            portfolio_link: Some("https://portfolio.example.com".to_string()),
        }
    }

    #[test]
    fn accepts_valid_application() {
        assert!(validate_new_application(&valid_application()).is_ok());
    }

    #[test]
    fn rejects_blank_proposal() {
        let application = NewApplication {
            proposal_message: "  \n ".to_string(),
            ..valid_application()
        };
        assert!(matches!(
            validate_new_application(&application),
            Err(ApplicationError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_positive_price() {
        for price in ["0", "-900"] {
            let application = NewApplication {
                expected_price: BigDecimal::from_str(price).unwrap(),
                ..valid_application()
            };
            assert!(
                matches!(validate_new_application(&application), Err(ApplicationError::Validation(_))),
                "expected rejection for price {price}"
            );
        }
    }

    #[test]
    fn portfolio_link_is_optional() {
        let application = NewApplication {
            portfolio_link: None,
            ..valid_application()
        };
        assert!(validate_new_application(&application).is_ok());
    }
}
