use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Open,
    InProgress,
    Completed,
}

/// Row shape of the `projects` table. Skills live in `project_skills`
/// and are attached separately to form a full [`Project`].
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub budget: BigDecimal,
    pub deadline: NaiveDate,
    pub status: ProjectStatus,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A project with its ordered required-skills list, as served to clients
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub budget: BigDecimal,
    pub deadline: NaiveDate,
    pub required_skills: Vec<String>,
    pub status: ProjectStatus,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn from_parts(row: ProjectRow, required_skills: Vec<String>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            budget: row.budget,
            deadline: row.deadline,
            required_skills,
            status: row.status,
            client_id: row.client_id,
            created_at: row.created_at,
        }
    }
}
