use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::messages::Message;
use crate::models::ListError;

pub const RFC400: &str = "https://datatracker.ietf.org/doc/html/rfc7231#section-6.5.1";
pub const RFC403: &str = "https://datatracker.ietf.org/doc/html/rfc7231#section-6.5.3";
pub const RFC404: &str = "https://datatracker.ietf.org/doc/html/rfc7231#section-6.5.4";
pub const RFC409: &str = "https://datatracker.ietf.org/doc/html/rfc7231#section-6.5.8";
pub const RFC500: &str = "https://datatracker.ietf.org/doc/html/rfc7231#section-6.6.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Forbidden,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Validation => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::Internal => 500,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Validation => "Bad Request",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::Internal => "Internal Server Error",
        }
    }

    pub fn instance(self) -> &'static str {
        match self {
            ErrorKind::NotFound => RFC404,
            ErrorKind::Conflict => RFC409,
            ErrorKind::Validation => RFC400,
            ErrorKind::Forbidden => RFC403,
            ErrorKind::Internal => RFC500,
        }
    }
}

/// Engine failures. Caller-facing variants carry the message key used to
/// render a localized problem; `detail` is for logs.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("not found: {detail}")]
    NotFound { key: &'static str, detail: String },

    #[error("conflict: {detail}")]
    Conflict { key: &'static str, detail: String },

    #[error("validation error: {detail}")]
    Validation { key: &'static str, detail: String },

    #[error("forbidden: {detail}")]
    Forbidden { key: &'static str, detail: String },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("data integrity violation: {0}")]
    Integrity(String),
}

impl EngineError {
    pub fn not_found(key: &'static str, detail: impl Into<String>) -> Self {
        EngineError::NotFound { key, detail: detail.into() }
    }

    pub fn conflict(key: &'static str, detail: impl Into<String>) -> Self {
        EngineError::Conflict { key, detail: detail.into() }
    }

    pub fn validation(key: &'static str, detail: impl Into<String>) -> Self {
        EngineError::Validation { key, detail: detail.into() }
    }

    pub fn forbidden(key: &'static str, detail: impl Into<String>) -> Self {
        EngineError::Forbidden { key, detail: detail.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::Conflict { .. } => ErrorKind::Conflict,
            EngineError::Validation { .. } => ErrorKind::Validation,
            EngineError::Forbidden { .. } => ErrorKind::Forbidden,
            EngineError::Storage(_) | EngineError::Integrity(_) => ErrorKind::Internal,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            EngineError::NotFound { key, .. }
            | EngineError::Conflict { key, .. }
            | EngineError::Validation { key, .. }
            | EngineError::Forbidden { key, .. } => *key,
            EngineError::Storage(_) => "StorageFailure",
            EngineError::Integrity(_) => "DataIntegrity",
        }
    }

    /// Request-specific context that helps the caller fix the request.
    /// Internal failures keep theirs in the logs.
    pub fn caller_detail(&self) -> Option<&str> {
        match self {
            EngineError::NotFound { detail, .. }
            | EngineError::Conflict { detail, .. }
            | EngineError::Validation { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

impl From<ListError> for EngineError {
    fn from(err: ListError) -> Self {
        let detail = err.to_string();
        match err {
            ListError::InvalidListType(_) => EngineError::validation("InvalidListType", detail),
            ListError::ItemAlreadyInList(_) => EngineError::conflict("ItemAlreadyInList", detail),
            ListError::MalformedCombination(_) => {
                EngineError::validation("MalformedCombination", detail)
            }
        }
    }
}

/// RFC 7807 style problem returned by every caller-facing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance: String,
}

impl ProblemDetails {
    pub fn new(kind: ErrorKind, message: Message) -> Self {
        Self {
            problem_type: kind.type_name().to_string(),
            title: message.title,
            status: kind.status(),
            detail: message.detail,
            instance: kind.instance().to_string(),
        }
    }
}

impl fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status, self.title, self.detail)
    }
}

impl std::error::Error for ProblemDetails {}
