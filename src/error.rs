//! Error types for missions
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, not logged in, unknown account)
//! - 3: Rejected by the ledger (unknown task, already claimed, not enough coins)
//! - 4: Operation failed (io, lock contention, corrupt account record)

use std::path::PathBuf;
use thiserror::Error;

use crate::ledger::Rejection;

/// Exit codes for the missions CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const REJECTED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for missions operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    // Ledger rejections (exit code 3)
    #[error("Rejected: {0}")]
    Rejected(#[from] Rejection),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Corrupt account record for {account}: {reason}")]
    CorruptAccount { account: String, reason: String },

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::NotLoggedIn
            | Error::AccountNotFound(_) => exit_codes::USER_ERROR,

            Error::Rejected(_) => exit_codes::REJECTED,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::LockFailed(_)
            | Error::CorruptAccount { .. }
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output, when the error carries any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Rejected(rejection) => Some(rejection.details()),
            Error::CorruptAccount { account, reason } => Some(serde_json::json!({
                "account": account,
                "reason": reason,
            })),
            _ => None,
        }
    }

    /// The ledger rejection behind this error, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Error::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// Result type alias for missions operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error body of the JSON envelope
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub message: String,
    pub code: i32,
    /// Rejection kind for ledger refusals, otherwise the exit-code class
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        let kind = match err {
            Error::Rejected(rejection) => rejection.kind(),
            _ if err.exit_code() == exit_codes::USER_ERROR => "user_error",
            _ => "operation_failed",
        };
        JsonError {
            message: err.to_string(),
            code: err.exit_code(),
            kind,
            details: err.details(),
        }
    }
}
