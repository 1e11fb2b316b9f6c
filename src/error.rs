//! Unified application error model for the console.
//! Every failure a UI can observe is one of these variants, each carrying a
//! machine code and a human message, plus helpers to map them for display.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::identity::ClaimError;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// No response was received from the backend.
    Network { code: String, message: String },
    /// Well-formed envelope with `isSuccess: false`.
    Rejected { code: String, message: String },
    Unauthorized { code: String, message: String },
    /// Non-success status whose body was not an envelope.
    Http { code: String, message: String },
    Credential { code: String, message: String },
    UserInput { code: String, message: String },
    Config { code: String, message: String },
    Io { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Network { code, .. }
            | AppError::Rejected { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::Http { code, .. }
            | AppError::Credential { code, .. }
            | AppError::UserInput { code, .. }
            | AppError::Config { code, .. }
            | AppError::Io { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Network { message, .. }
            | AppError::Rejected { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::Http { message, .. }
            | AppError::Credential { message, .. }
            | AppError::UserInput { message, .. }
            | AppError::Config { message, .. }
            | AppError::Io { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn network<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Network { code: code.into(), message: msg.into() } }
    pub fn rejected<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Rejected { code: code.into(), message: msg.into() } }
    pub fn unauthorized<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Unauthorized { code: code.into(), message: msg.into() } }
    pub fn http<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Http { code: code.into(), message: msg.into() } }
    pub fn credential<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Credential { code: code.into(), message: msg.into() } }
    pub fn user<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn config<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Config { code: code.into(), message: msg.into() } }
    pub fn io<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Io { code: code.into(), message: msg.into() } }
    pub fn internal<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to the nearest HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Network { .. } => 503,
            AppError::Rejected { .. } => 400,
            AppError::Unauthorized { .. } => 401,
            AppError::Http { code, .. } => code
                .strip_prefix("http_")
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(502),
            AppError::Credential { .. } => 401,
            AppError::UserInput { .. } => 400,
            AppError::Config { .. } | AppError::Io { .. } | AppError::Internal { .. } => 500,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Unauthorized { .. } | AppError::Credential { .. })
    }

    /// Text an inline message or alert should show for this error.
    /// Transport failures get a generic line; server rejections are shown verbatim.
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Network { .. } => NETWORK_ERROR_MESSAGE,
            _ => self.message(),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal".into(), message: err.to_string() }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() { "timeout" } else if err.is_connect() { "connect_failed" } else { "network_error" };
        AppError::Network { code: code.into(), message: err.to_string() }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal { code: "json_error".into(), message: err.to_string() }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io { code: "io_error".into(), message: err.to_string() }
    }
}

impl From<ClaimError> for AppError {
    fn from(err: ClaimError) -> Self {
        AppError::Credential { code: "malformed_token".into(), message: err.to_string() }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
