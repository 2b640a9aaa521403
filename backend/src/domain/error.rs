//! The one error type every service returns.
//!
//! It carries a stable [`ErrorCode`], a human-readable message, optional
//! structured details and the trace id of the request that raised it.
//! Transport adapters decide how each code is presented.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::TraceId;

/// Response header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Failure category, serialised in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed input or a failed validation rule.
    InvalidRequest,
    /// No session, or credentials did not match.
    Unauthorized,
    /// Signed in but the role or scope does not allow the action.
    Forbidden,
    /// Absent, or outside the caller's scope.
    NotFound,
    /// A uniqueness rule rejected the write.
    Conflict,
    /// The entity store cannot be reached.
    ServiceUnavailable,
    /// Anything else; never shown to clients verbatim.
    InternalError,
}

impl ErrorCode {
    fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid request",
            Self::Unauthorized => "authentication required",
            Self::Forbidden => "not permitted",
            Self::NotFound => "not found",
            Self::Conflict => "conflicting record",
            Self::ServiceUnavailable => "service unavailable",
            Self::InternalError => "internal error",
        }
    }
}

/// Domain error.
///
/// The message is never blank: constructors substitute a generic message for
/// the code when given an empty one, and deserialisation rejects it.
///
/// # Examples
/// ```
/// use herdbook::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("no such batch");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(Error::forbidden("  ").message(), "not permitted");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    #[schema(example = "not_found")]
    code: ErrorCode,
    #[schema(example = "animal not found")]
    message: String,
    #[schema(example = "6a2b6f1e-2c1d-4b8e-9d36-0f9a5b1c2d3e")]
    trace_id: Option<String>,
    details: Option<Value>,
}

/// Why an error payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    #[error("error message must not be empty")]
    EmptyMessage,
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

impl Error {
    /// Build an error tagged with the current trace id, if any.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.fallback_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Trace id of the request that raised the error.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details, e.g. the offending field.
    ///
    /// ```
    /// use herdbook::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "name" }));
    /// assert_eq!(err.details(), Some(&json!({ "field": "name" })));
    /// ```
    #[must_use]
    pub fn with_details(self, details: Value) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }

    /// Replace the trace id. Blank ids are ignored.
    #[must_use]
    pub fn with_trace_id(self, trace_id: impl Into<String>) -> Self {
        let trace_id = trace_id.into();
        if trace_id.trim().is_empty() {
            return self;
        }
        Self {
            trace_id: Some(trace_id),
            ..self
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

/// Wire shape. Decoding never picks up the ambient trace id.
#[derive(Serialize, Deserialize)]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        let Error {
            code,
            message,
            trace_id,
            details,
        } = value;
        Self {
            code,
            message,
            trace_id,
            details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(dto: ErrorDto) -> Result<Self, ErrorValidationError> {
        if dto.message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        if dto.trace_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        Ok(Self {
            code: dto.code,
            message: dto.message,
            trace_id: dto.trace_id,
            details: dto.details,
        })
    }
}
