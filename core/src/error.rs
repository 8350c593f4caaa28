//! Error types for the Canada Post client.
//!
//! # Design
//! `ValidationError` is raised while building a request, before anything
//! touches the network. Everything that happens after the request is sent
//! lands in `ApiError`, which also wraps validation failures so the façade
//! can return a single error type. Non-2xx responses keep the raw status and
//! body because the vendor puts its diagnostic `<messages>` document there.

use thiserror::Error;

/// A required field is missing or a length constraint is violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} can have up to {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// A single-line street address could not be split into two 44-character lines.
    #[error("street address {0:?} cannot be split into two 44 character lines")]
    StreetSplit(String),

    #[error("{field} is required to {operation}")]
    Missing {
        field: &'static str,
        operation: &'static str,
    },

    #[error("service {0} requires the destination to have a phone number")]
    PhoneRequired(String),

    #[error("addresses within {0} require a postal code")]
    PostalCodeRequired(String),

    #[error("customs requires items: international shipping needs a list of the parcel items")]
    CustomsRequiresItems,

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} {value:?} cannot be used as a URL path segment")]
    UnsafePathSegment { field: &'static str, value: String },
}

/// Errors returned by the client and the transport.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// HTTP 202 while fetching an artifact; poll again later.
    #[error("artifact is not ready yet")]
    NotReady,

    /// The object has no hyperlink with the requested relation.
    #[error("no {0:?} link on this object")]
    MissingLink(String),

    /// Connection, TLS or I/O failure reported by the HTTP client.
    #[error("transport failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            ApiError::NotReady => Some(202),
            _ => None,
        }
    }

    pub(crate) fn malformed(err: impl std::fmt::Display) -> Self {
        ApiError::DeserializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_converts_into_api_error() {
        let err: ApiError = ValidationError::CustomsRequiresItems.into();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::CustomsRequiresItems)
        ));
        assert!(err.to_string().contains("customs requires items"));
    }

    #[test]
    fn http_error_display_includes_status_and_body() {
        let err = ApiError::HttpError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn too_long_reports_limits() {
        let err = ValidationError::TooLong {
            field: "city",
            max: 40,
            actual: 41,
        };
        assert_eq!(err.to_string(), "city can have up to 40 characters, got 41");
    }
}
