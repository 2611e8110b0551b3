use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password;
use crate::database::is_unique_violation;
use crate::database::models::user::{User, UserRole};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Email already registered: {0}")]
    EmailTaken(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Account directory: registration, lookup, and credential verification
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new account. Email uniqueness is enforced both by a
    /// pre-check (friendly error) and by the `users_email_key` constraint
    /// (closes the duplicate-registration race).
    pub async fn register(&self, new_user: NewUser) -> Result<User, UserError> {
        validate_new_user(&new_user)?;

        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&new_user.email)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(UserError::EmailTaken(new_user.email));
        }

        let password_hash = password::hash(&new_user.password);

        let query = format!(
            "INSERT INTO users (id, name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(&password_hash)
            .bind(new_user.role)
            .fetch_one(&self.pool)
            .await;

        match inserted {
            Ok(user) => {
                tracing::info!("Registered user {} ({:?})", user.id, user.role);
                Ok(user)
            }
            Err(e) if is_unique_violation(&e, "users_email_key") => {
                Err(UserError::EmailTaken(new_user.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, UserError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Resolve an email/password pair to an account. A missing account and a
    /// wrong password are indistinguishable to the caller.
    pub async fn verify_credentials(&self, email: &str, plain_password: &str) -> Result<User, UserError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !password::verify(plain_password, &user.password_hash) {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }
}

fn validate_new_user(new_user: &NewUser) -> Result<(), UserError> {
    if new_user.name.trim().is_empty() {
        return Err(UserError::Validation("Name is required".to_string()));
    }

    let email = new_user.email.trim();
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(UserError::Validation("Invalid email format".to_string()));
    }

    if new_user.password.len() < password::MIN_PASSWORD_LENGTH {
        return Err(UserError::Validation(format!(
            "Password must be at least {} characters",
            password::MIN_PASSWORD_LENGTH
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_user() -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "long-enough-password".to_string(),
            role: UserRole::Client,
        }
    }

    #[test]
    fn accepts_valid_registration() {
        assert!(validate_new_user(&valid_user()).is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        let user = NewUser { name: "   ".to_string(), ..valid_user() };
        assert!(matches!(validate_new_user(&user), Err(UserError::Validation(_))));
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["no-at-sign", "@nodomain", "nolocal@", "two@@ats"] {
            let user = NewUser { email: email.to_string(), ..valid_user() };
            assert!(
                matches!(validate_new_user(&user), Err(UserError::Validation(_))),
                "expected rejection for {email}"
            );
        }
    }

    #[test]
    fn rejects_short_password() {
        let user = NewUser { password: "short".to_string(), ..valid_user() };
        assert!(matches!(validate_new_user(&user), Err(UserError::Validation(_))));
    }
}
