//! Wire error envelope for the `TermTask` API.
//!
//! Every non-2xx response carries a JSON body of the shape
//! `{"error": {"code": "...", "message": "...", "details": {...}}}`.
//! Codes are a closed set on this server, but clients must tolerate
//! codes they do not know; unknown codes decode to
//! [`ErrorCode::Unknown`].

use serde::{Deserialize, Serialize};

/// Machine-readable error codes carried in the error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing, expired, or invalid credential.
    Unauthorized,
    /// The request body failed validation.
    Validation,
    /// The addressed resource does not exist (or belongs to another user).
    NotFound,
    /// The credential is valid but does not permit the operation.
    Forbidden,
    /// The request conflicts with existing state (e.g. duplicate email).
    Conflict,
    /// Any code the client does not recognize.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// The `error` object inside the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Optional structured context (e.g. per-field validation info).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Top-level error body: `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error payload.
    pub error: ErrorDetail,
}

impl ErrorEnvelope {
    /// Builds an envelope with no details payload.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code,
                message: message.into(),
                details: None,
            },
        }
    }

    /// Builds an envelope carrying a structured details payload.
    #[must_use]
    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code,
                message: message.into(),
                details: Some(details),
            },
        }
    }
}
