// Error handling framework
// Store faults, repository outcomes, and the API-facing error shape

use thiserror::Error;

/// Database-specific errors
///
/// Everything the query executor can surface. Repositories pass these through
/// unmodified unless a specific translation applies (see [`RepositoryError`]).
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Database health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Duplicate key violation: {0}")]
    DuplicateKey(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Failed to decode row: {0}")]
    RowDecodeFailed(String),
}

/// Errors raised by the job and user repositories
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("No {entity}: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("No data")]
    EmptyUpdate,

    #[error("Invalid username/password")]
    InvalidCredentials,

    #[error("Duplicate {field}: {value}")]
    Duplicate {
        field: &'static str,
        value: String,
        #[source]
        source: DatabaseError,
    },

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

/// API response error type for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let code = match &err {
            RepositoryError::NotFound { .. } => "NOT_FOUND",
            RepositoryError::EmptyUpdate => "BAD_REQUEST",
            RepositoryError::InvalidCredentials => "UNAUTHORIZED",
            RepositoryError::Duplicate { .. } => "CONFLICT",
            RepositoryError::PasswordHash(_) => "INTERNAL_ERROR",
            RepositoryError::Store(_) => "DATABASE_ERROR",
        };
        ApiError::new(code, err.to_string())
    }
}

// Implement From for common external errors
impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                // Check for specific database error codes
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => DatabaseError::DuplicateKey(db_err.message().to_string()),
                        "23503" => DatabaseError::ForeignKeyViolation(db_err.message().to_string()),
                        _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                    }
                } else {
                    DatabaseError::QueryFailed(db_err.message().to_string())
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionFailed(err.to_string())
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::RowDecodeFailed(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for RepositoryError {
    fn from(err: bcrypt::BcryptError) -> Self {
        RepositoryError::PasswordHash(err.to_string())
    }
}
