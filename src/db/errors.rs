use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("insufficient quantity for '{name}': available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i32,
        requested: i32,
    },
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
    #[error("Connection pool error: {0}")]
    ConnectionPoolError(#[from] diesel::r2d2::PoolError),
}

impl RepositoryError {
    /// Translates the diesel unique-violation produced by duplicate inserts
    /// into a Conflict carrying a caller-facing message.
    pub fn on_unique_violation(self, message: &str) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match self {
            RepositoryError::DatabaseError(Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            )) => RepositoryError::Conflict(message.to_string()),
            other => other,
        }
    }
}
