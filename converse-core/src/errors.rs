// converse-core/src/errors.rs
use aws_credential_types::provider::error::CredentialsError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse grouping used by the CLI to pick a headline for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The payload file could not be loaded or failed validation. No request was sent.
    Input,
    /// Credentials could not be loaded or were rejected by the service.
    Credentials,
    /// The request never got a reply from the service.
    Network,
    /// The service replied with an error or an unreadable body.
    Service,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorCategory::Input => "Payload error",
            ErrorCategory::Credentials => "AWS credentials error",
            ErrorCategory::Network => "Network error",
            ErrorCategory::Service => "Bedrock service error",
        };
        f.write_str(label)
    }
}

/// Classification of an error reply from the Converse endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    Authentication,
    Authorization,
    Throttling,
    MalformedRequest,
    ModelUnavailable,
    Other,
}

impl ServiceErrorKind {
    /// Maps an AWS error code (the `x-amzn-ErrorType` header or `__type` body field)
    /// to a kind. Unknown codes fall back to the HTTP status.
    pub fn classify(code: Option<&str>, status: u16) -> Self {
        let by_code = code.and_then(|c| match c {
            "UnrecognizedClientException"
            | "InvalidSignatureException"
            | "ExpiredTokenException"
            | "IncompleteSignature"
            | "MissingAuthenticationTokenException" => Some(Self::Authentication),
            "AccessDeniedException" => Some(Self::Authorization),
            "ThrottlingException" | "ServiceQuotaExceededException" => Some(Self::Throttling),
            "ValidationException" => Some(Self::MalformedRequest),
            "ResourceNotFoundException"
            | "ModelNotReadyException"
            | "ModelTimeoutException"
            | "ModelErrorException"
            | "ServiceUnavailableException" => Some(Self::ModelUnavailable),
            _ => None,
        });
        by_code.unwrap_or(match status {
            401 => Self::Authentication,
            403 => Self::Authorization,
            429 => Self::Throttling,
            400 => Self::MalformedRequest,
            404 | 503 => Self::ModelUnavailable,
            _ => Self::Other,
        })
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication failed",
            Self::Authorization => "access denied",
            Self::Throttling => "request throttled or quota exceeded",
            Self::MalformedRequest => "request rejected as malformed",
            Self::ModelUnavailable => "model unavailable",
            Self::Other => "request failed",
        }
    }
}

/// An error reply from the service, with whatever detail it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (HTTP {}", self.kind.describe(), self.status)?;
        if let Some(code) = &self.code {
            write!(f, ", {}", code)?;
        }
        write!(f, "): {}", self.message)
    }
}

/// Errors that can occur while loading a payload or calling the Converse API.
#[derive(Error, Debug)]
pub enum ConverseError {
    #[error("Payload file '{}' not found", .path.display())]
    PayloadNotFound { path: PathBuf },

    #[error("Permission denied reading payload file '{}'", .path.display())]
    PayloadPermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read payload file '{}': {source}", .path.display())]
    PayloadRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON syntax error, with the position serde_json reported.
    #[error("Invalid JSON in '{}' at line {line}, column {column}: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        line: usize,
        column: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Payload '{}' is missing required field '{field}'", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("Payload '{}' has an invalid '{field}': {reason}", .path.display())]
    InvalidField {
        path: PathBuf,
        field: String,
        reason: String,
    },

    #[error("Payload '{}' has an empty 'messages' list", .path.display())]
    EmptyMessages { path: PathBuf },

    /// Endpoint or region settings could not be turned into a request URL.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The AWS credential provider chain failed, for example an expired SSO
    /// session or a failing `credential_process`.
    #[error("Failed to load AWS credentials: {0}")]
    Credentials(#[source] CredentialsError),

    #[error("Failed to sign request: {0}")]
    Signing(String),

    #[error("Network error calling the Converse API: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Converse API error: {0}")]
    Service(ServiceError),

    /// The service answered 2xx but the body was not a Converse response.
    #[error("Failed to decode Converse API response: {0}")]
    InvalidResponse(String),
}

impl ConverseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConverseError::PayloadNotFound { .. }
            | ConverseError::PayloadPermissionDenied { .. }
            | ConverseError::PayloadRead { .. }
            | ConverseError::InvalidJson { .. }
            | ConverseError::MissingField { .. }
            | ConverseError::InvalidField { .. }
            | ConverseError::EmptyMessages { .. } => ErrorCategory::Input,
            ConverseError::Credentials(_) | ConverseError::Signing(_) => ErrorCategory::Credentials,
            ConverseError::Service(err) => match err.kind {
                ServiceErrorKind::Authentication | ServiceErrorKind::Authorization => {
                    ErrorCategory::Credentials
                }
                _ => ErrorCategory::Service,
            },
            ConverseError::Network(_) => ErrorCategory::Network,
            ConverseError::Config(_) | ConverseError::InvalidResponse(_) => ErrorCategory::Service,
        }
    }

    pub fn invalid_field(
        path: impl Into<PathBuf>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConverseError::InvalidField {
            path: path.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = ConverseError> = std::result::Result<T, E>;
