use sqlx::PgPool;

use crate::app_error::AppError;

pub mod subscription;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

/// SQLSTATE codes the subscriptions table can raise on bad input.
const CHECK_VIOLATION: &str = "23514";
const NOT_NULL_VIOLATION: &str = "23502";

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return AppError::NotFound("subscription");
        }

        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                Some(CHECK_VIOLATION) => {
                    let constraint = db_err.constraint().unwrap_or("check");
                    return AppError::InvalidInput(format!("value violates {constraint}"));
                }
                Some(NOT_NULL_VIOLATION) => {
                    return AppError::InvalidInput("required field is missing".into());
                }
                _ => {}
            }
        }

        // Logged at error level once the response is built.
        tracing::debug!(error = ?err, "Database error");
        AppError::Database("database operation failed".into())
    }
}
