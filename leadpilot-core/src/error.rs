//! Error types for LeadPilot client operations

use thiserror::Error;

/// Client-side validation failures, raised before a request is issued.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        Self::RequiredFieldMissing {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Master error type for everything the client surfaces to a view.
///
/// `Clone` because the query cache stores the last error per key and hands
/// a copy to every subscriber.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The server answered with a status outside the 2xx range.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request never produced a response (connect, timeout, body read).
    #[error("Network error: {0}")]
    Network(String),

    /// A 2xx body did not match the schema expected for the endpoint.
    #[error("Unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Not authenticated: no access token stored")]
    MissingToken,

    #[error("I/O error: {0}")]
    Io(String),
}

impl ClientError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// HTTP status for `Http` errors, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::MissingToken) || self.status() == Some(401)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
