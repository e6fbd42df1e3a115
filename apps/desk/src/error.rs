//! # Desk Error Type
//!
//! What the cashier sees when a command fails.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Desk                               │
//! │                                                                         │
//! │  console line ──► Command ──► commands::*  Result<String, DeskError>    │
//! │                                   │                                     │
//! │        ValidationError ───────────┤  VALIDATION_ERROR                   │
//! │        FlowError ─────────────────┤  WORKFLOW / NOT_FOUND               │
//! │        ClientError ───────────────┤  NETWORK / API / UNAUTHORIZED ...   │
//! │                                   ▼                                     │
//! │                   "[NOT_FOUND] No bill found for 'INV-9'"               │
//! │                                                                         │
//! │  The desk stays on the same step after any error. Nothing is fatal.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tillpoint_client::ClientError;
use tillpoint_core::{FlowError, ValidationError};

/// Error returned from desk commands.
///
/// ## Serialization
/// ```json
/// { "code": "NOT_FOUND", "message": "No bill found for 'INV-9'" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

pub type DeskResult<T> = Result<T, DeskError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Nothing matched (bill search, ids not on screen)
    NotFound,

    /// Input rejected before any request was sent
    ValidationError,

    /// Command does not fit the current step
    Workflow,

    /// Login required or refused
    Unauthorized,

    /// Backend unreachable or too slow; retrying may help
    Network,

    /// Backend refused the request
    Api,

    /// Backend answered with a shape the client does not know
    UnexpectedResponse,

    /// Unknown command or bad arguments
    Usage,

    Internal,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Workflow => "WORKFLOW",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Network => "NETWORK",
            ErrorCode::Api => "API",
            ErrorCode::UnexpectedResponse => "UNEXPECTED_RESPONSE",
            ErrorCode::Usage => "USAGE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl DeskError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        DeskError {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        DeskError::new(ErrorCode::Usage, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DeskError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DeskError::new(ErrorCode::Internal, message)
    }
}

impl From<ValidationError> for DeskError {
    fn from(err: ValidationError) -> Self {
        DeskError::validation(err.to_string())
    }
}

impl From<FlowError> for DeskError {
    fn from(err: FlowError) -> Self {
        let code = match &err {
            FlowError::NoBillsFound { .. }
            | FlowError::BillNotListed(_)
            | FlowError::ItemNotOnBill(_)
            | FlowError::ProductNotListed(_) => ErrorCode::NotFound,
            FlowError::Validation(_) => ErrorCode::ValidationError,
            _ => ErrorCode::Workflow,
        };
        DeskError::new(code, err.to_string())
    }
}

impl From<ClientError> for DeskError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Validation(e) => e.into(),
            ClientError::Transport(_) | ClientError::Timeout => DeskError::new(
                ErrorCode::Network,
                format!("{err}. Check the connection and try again."),
            ),
            ClientError::Unauthorized(message) => DeskError::new(
                ErrorCode::Unauthorized,
                format!("{message}. Use `login <user> <password>`."),
            ),
            ClientError::NotLoggedIn => DeskError::new(
                ErrorCode::Unauthorized,
                "Not logged in. Use `login <user> <password>`.",
            ),
            ClientError::Api { status, .. } if status == 404 => {
                DeskError::new(ErrorCode::NotFound, err.to_string())
            }
            ClientError::Api { status, .. } if status >= 500 => DeskError::new(
                ErrorCode::Api,
                format!("{err}. The server had a problem; try again shortly."),
            ),
            ClientError::Api { .. } => DeskError::new(ErrorCode::Api, err.to_string()),
            ClientError::Decode { .. } => {
                tracing::error!(error = %err, "Unrecognized backend response");
                DeskError::new(ErrorCode::UnexpectedResponse, err.to_string())
            }
            ClientError::Session(_)
            | ClientError::InvalidConfig(_)
            | ClientError::InvalidUrl(_)
            | ClientError::ConfigLoadFailed(_) => {
                tracing::error!(error = %err, "Local client failure");
                DeskError::internal(err.to_string())
            }
        }
    }
}

impl std::fmt::Display for DeskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for DeskError {}
