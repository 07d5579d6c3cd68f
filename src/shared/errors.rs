use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    /// Whether this error is likely transient (connection refused, pool
    /// exhausted) and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Unavailable(_))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) => {
                DomainError::Unavailable(err.to_string())
            }
            other => DomainError::Database(other.to_string()),
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_are_transient() {
        let err: DomainError =
            sea_orm::DbErr::Conn(sea_orm::RuntimeErr::Internal("refused".into())).into();
        assert!(err.is_transient());
        assert!(matches!(err, DomainError::Unavailable(_)));
    }

    #[test]
    fn query_errors_are_not_transient() {
        let err: DomainError = sea_orm::DbErr::Custom("bad column".into()).into();
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "Database error: Custom Error: bad column");
    }

    #[test]
    fn not_found_formats_entity_and_id() {
        let err = DomainError::not_found("Rate", 42);
        assert_eq!(err.to_string(), "Not found: Rate with id=42");
    }
}
