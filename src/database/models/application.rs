use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A freelancer's proposal against a project. Removed only when its
/// parent project is deleted; there is no standalone withdraw operation.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub proposal_message: String,
    pub expected_price: BigDecimal,
    pub portfolio_link: Option<String>,
    pub status: ApplicationStatus,
    pub project_id: Uuid,
    pub freelancer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_through_json() {
        for (status, text) in [
            (ApplicationStatus::Pending, "\"PENDING\""),
            (ApplicationStatus::Accepted, "\"ACCEPTED\""),
            (ApplicationStatus::Rejected, "\"REJECTED\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), text);
            let parsed: ApplicationStatus = serde_json::from_str(text).unwrap();
            assert_eq!(parsed, status);
        }
    }
}
