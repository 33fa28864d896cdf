//! Error types for synchronization

use scribe_editor::{EditorError, ValidationError};
use scribe_parser::ParseError;
use thiserror::Error;

use crate::transport::TransportError;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Editor error: {0}")]
    Editor(EditorError),

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("Registration rejected: {0}")]
    RegistrationRejected(String),
}

impl SyncError {
    /// Whether the caller should send the user to log in
    pub fn needs_login(&self) -> bool {
        matches!(self, SyncError::AuthRequired)
    }
}

impl From<TransportError> for SyncError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http { status: 401, .. } => SyncError::AuthRequired,
            TransportError::Http {
                status: 403,
                message,
            } => SyncError::Forbidden(message),
            TransportError::Http {
                status: 404,
                message,
            } => SyncError::NotFound(message),
            TransportError::Http { status, message } => SyncError::Server { status, message },
            TransportError::Network(message) => SyncError::Transport(message),
            TransportError::InvalidResponse(message) => SyncError::Decode(message),
            TransportError::InvalidRequest(message) => SyncError::InvalidRequest(message),
        }
    }
}

impl From<EditorError> for SyncError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::Validation(err) => SyncError::Validation(err),
            EditorError::Parse(err) => SyncError::Parse(err),
            other => SyncError::Editor(other),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_editor::Field;

    fn http(status: u16) -> TransportError {
        TransportError::Http {
            status,
            message: "nope".to_string(),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(SyncError::from(http(401)), SyncError::AuthRequired);
        assert_eq!(
            SyncError::from(http(403)),
            SyncError::Forbidden("nope".to_string())
        );
        assert_eq!(
            SyncError::from(http(404)),
            SyncError::NotFound("nope".to_string())
        );
        assert_eq!(
            SyncError::from(http(500)),
            SyncError::Server {
                status: 500,
                message: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_request_errors_are_not_decode_errors() {
        assert_eq!(
            SyncError::from(TransportError::InvalidRequest("bad mime".to_string())),
            SyncError::InvalidRequest("bad mime".to_string())
        );
    }

    #[test]
    fn test_editor_errors_flatten() {
        let validation = EditorError::Validation(ValidationError::new(Field::Title));
        assert!(matches!(
            SyncError::from(validation),
            SyncError::Validation(ValidationError { field: Field::Title })
        ));
        assert!(matches!(
            SyncError::from(EditorError::SubmitInFlight),
            SyncError::Editor(EditorError::SubmitInFlight)
        ));
    }
}
