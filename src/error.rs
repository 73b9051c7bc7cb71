use serde_json::Value;
use thiserror::Error;

/// SDK-specific errors
#[derive(Error, Debug)]
pub enum SdkError {
    /// A request is missing required fields, carries malformed values, or uses
    /// deprecated field names. Raised before any payload is produced.
    #[error("Validation error for {operation}: {reason}")]
    Validation {
        operation: String,
        fields: Vec<String>,
        reason: String,
    },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Normalized failures from the HTTP boundary.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request was sent but no response came back (connect failure, timeout).
    #[error("Network error - no response received: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status} ({code}): {message}")]
    Http {
        status: u16,
        code: String,
        message: String,
        body: Option<Value>,
    },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl TransportError {
    pub fn code(&self) -> &str {
        match self {
            TransportError::Network(_) => "NETWORK_ERROR",
            TransportError::Http { code, .. } => code,
            TransportError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }
}

impl SdkError {
    /// Machine-checkable error code, stable across message wording changes.
    pub fn code(&self) -> &str {
        match self {
            SdkError::Validation { .. } => "VALIDATION_ERROR",
            SdkError::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
            SdkError::Transport(err) => err.code(),
            SdkError::Signing(_) => "SIGNING_ERROR",
            SdkError::Serialization(_) => "SERIALIZATION_ERROR",
            SdkError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Transport(TransportError::Http { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Field paths named by a validation failure.
    pub fn fields(&self) -> &[String] {
        match self {
            SdkError::Validation { fields, .. } => fields,
            _ => &[],
        }
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            SdkError::Transport(TransportError::Network(err.to_string()))
        } else {
            SdkError::Transport(TransportError::Unknown(err.to_string()))
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = SdkError::Transport(TransportError::Network("refused".into()));
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert_eq!(err.status(), None);

        let err = SdkError::Transport(TransportError::Http {
            status: 422,
            code: "HTTP_422".into(),
            message: "bad order".into(),
            body: None,
        });
        assert_eq!(err.code(), "HTTP_422");
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.to_string(), "HTTP 422 (HTTP_422): bad order");

        let err = SdkError::UnsupportedOperation("cancelOrder".into());
        assert_eq!(err.code(), "UNSUPPORTED_OPERATION");
        assert!(err.to_string().contains("cancelOrder"));
    }

    #[test]
    fn test_validation_fields() {
        let err = SdkError::Validation {
            operation: "createOrder".into(),
            fields: vec!["coin".into()],
            reason: "missing required field(s): coin".into(),
        };
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.fields(), ["coin".to_string()]);
    }
}
