use thiserror::Error;

/// Errors from storage operations (used by trait definitions in mentor-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors related to persona registry operations.
#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("persona not found: '{0}'")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors related to setting up a chat engine.
///
/// `send_message` itself never fails outwardly; these surface before any
/// network attempt.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("persona '{0}' has no chat endpoint configured")]
    UnmappedPersona(String),
}

/// Failures talking to a persona's remote chat endpoint.
///
/// The engine collapses all of these into the same apology message; the
/// variants exist so the detail can be logged.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed reply: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_persona_error_from_repository() {
        let err: PersonaError = RepositoryError::Connection.into();
        assert_eq!(err.to_string(), "storage error: database connection error");
    }

    #[test]
    fn test_backend_status_display() {
        let err = BackendError::Status {
            status: 503,
            body: "down".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: down");
    }

    #[test]
    fn test_unmapped_persona_display() {
        let err = ChatError::UnmappedPersona("Coach".to_string());
        assert!(err.to_string().contains("Coach"));
    }
}
