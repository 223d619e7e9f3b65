//! Error types for querykit

use thiserror::Error;

/// Result type alias for builder operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Result type alias for execution operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors produced while accumulating or compiling a query.
///
/// Every failure is detected synchronously; `compile()` never returns partial SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Malformed static input (empty names, bad templates, duplicate columns, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unsafe table/column/alias name
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Operator token not in the allow-list
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Required clause missing, or a clause present on a query kind it does not apply to
    #[error("Missing required clause: {0}")]
    MissingRequiredClause(String),

    /// Internal inconsistency, e.g. malformed nested builder state
    #[error("Compile failed: {0}")]
    CompileFailed(String),
}

impl BuildError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }

    pub fn unsupported_operator(message: impl Into<String>) -> Self {
        Self::UnsupportedOperator(message.into())
    }

    pub fn missing_clause(message: impl Into<String>) -> Self {
        Self::MissingRequiredClause(message.into())
    }

    pub fn compile_failed(message: impl Into<String>) -> Self {
        Self::CompileFailed(message.into())
    }

    /// Check if this is an identifier validation error
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_))
    }

    /// Check if this is an operator validation error
    pub fn is_unsupported_operator(&self) -> bool {
        matches!(self, Self::UnsupportedOperator(_))
    }

    /// Check if this is a missing/inapplicable clause error
    pub fn is_missing_clause(&self) -> bool {
        matches!(self, Self::MissingRequiredClause(_))
    }
}

/// Errors produced by the execution boundary.
#[derive(Debug, Error)]
pub enum DbError {
    /// The query could not be compiled; nothing was sent to the server
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),
}

impl DbError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Parse a tokio_postgres error into a more specific DbError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
