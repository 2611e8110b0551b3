pub mod manager;
pub mod models;

pub use manager::{DatabaseError, DatabaseManager};

/// True when a sqlx error is a violation of the named unique constraint.
/// Used to translate duplicate-insert races into domain conflicts.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}
