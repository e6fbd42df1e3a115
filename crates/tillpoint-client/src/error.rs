//! # Client Error Types
//!
//! Everything that can go wrong between the desk and the backend.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Client Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     API                 │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  Api {status, message}  │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Unauthorized           │ │
//! │  │  ConfigLoad     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Decoding     │  │     Session     │  │      Local rules        │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Decode         │  │  Session        │  │  Validation             │ │
//! │  │  (unknown shape)│  │  NotLoggedIn    │  │  (before any request)   │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is retried automatically except the single replay after a
//! token refresh. [`ClientError::is_retryable`] only tells the cashier
//! whether trying again by hand makes sense.

use serde_json::Value;
use thiserror::Error;
use tillpoint_core::ValidationError;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the backend or the connection broke mid-request.
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    // =========================================================================
    // API Errors
    // =========================================================================
    /// Non-2xx response.
    ///
    /// `message` is the best human-readable text found in the body;
    /// `detail` keeps a structured `detail` object when the backend sent one.
    #[error("{message} (HTTP {status})")]
    Api {
        status: u16,
        message: String,
        detail: Option<Value>,
    },

    /// Credentials rejected, or the session could not be refreshed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // =========================================================================
    // Decoding Errors
    // =========================================================================
    /// Response body did not match what the endpoint is known to return.
    #[error("Unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    // =========================================================================
    // Session Errors
    // =========================================================================
    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Not logged in")]
    NotLoggedIn,

    // =========================================================================
    // Local Validation
    // =========================================================================
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode {
                endpoint: err
                    .url()
                    .map(|u| u.path().to_string())
                    .unwrap_or_default(),
                reason: err.to_string(),
            }
        } else if err.is_builder() {
            ClientError::InvalidUrl(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    pub(crate) fn decode(endpoint: &str, reason: impl Into<String>) -> Self {
        ClientError::Decode {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }

    /// True if resubmitting the same request could succeed.
    ///
    /// ## Retryable
    /// - Transport failures and timeouts
    /// - 5xx responses (backend trouble)
    ///
    /// ## Not Retryable
    /// - 4xx responses, validation and decode failures
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) | ClientError::Timeout => true,
            ClientError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// True if the cashier has to log in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_) | ClientError::NotLoggedIn)
    }

    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized(_) => Some(401),
            _ => None,
        }
    }
}
