//! # Error Types
//!
//! Domain-specific error types for tillpoint-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tillpoint-core errors (this file)                                     │
//! │  ├── FlowError        - Illegal workflow transitions                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tillpoint-client errors (separate crate)                              │
//! │  └── ClientError      - Transport / API / decode failures              │
//! │                                                                         │
//! │  Desk errors (in app)                                                  │
//! │  └── DeskError        - What the cashier sees (code + message)         │
//! │                                                                         │
//! │  Flow: ValidationError → FlowError → DeskError → Console               │
//! │                          ClientError ─┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error here is raised BEFORE a network call. None of them is fatal:
//! the desk stays on the same step so the cashier can correct and retry.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Flow Error
// =============================================================================

/// Workflow errors.
///
/// Raised when an operation does not fit the step the desk is on, or when a
/// business rule of the return/replace/transfer flows is violated.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The operation belongs to a different step.
    ///
    /// ## When This Occurs
    /// - `qty` typed while still on the search step
    /// - `submit` typed while choosing between return and replace
    #[error("Cannot {operation} while {step}")]
    WrongStep {
        operation: &'static str,
        step: &'static str,
    },

    /// Bill search returned nothing.
    #[error("No bill found for '{query}'")]
    NoBillsFound { query: String },

    /// Bill id not among the current search results.
    #[error("Bill {0} is not in the current results")]
    BillNotListed(i64),

    /// Item id not on the selected bill.
    #[error("Item {0} is not on this bill")]
    ItemNotOnBill(i64),

    /// Item has no remaining (non-returned) quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Bill #1042: Fan ×2, returned 2
    ///      │
    ///      ▼
    /// select_item(fan)
    ///      │
    ///      ▼
    /// ItemFullyReturned { name: "Fan" }  → "Fan has already been fully returned"
    /// ```
    #[error("{name} has already been fully returned")]
    ItemFullyReturned { name: String },

    /// Refund method chosen on a pay-later bill (nothing was collected).
    #[error("Bill {bill_number} is pay-later: no refund is owed")]
    NoRefundOnPayLater { bill_number: String },

    /// Replacement sub-type is chosen once per replacement.
    #[error("Replacement type already chosen ({0})")]
    ReplacementTypeLocked(&'static str),

    /// Operation needs a specific replacement sub-type.
    #[error("Only available for {0} replacements")]
    WrongReplacementType(&'static str),

    /// Product id not among the latest product search results.
    #[error("Product {0} is not in the current search results")]
    ProductNotListed(i64),

    /// A replacement product is already locked in.
    #[error("Replacement product {0} already selected; remove it first")]
    ProductLocked(String),

    /// No settlement is needed when the delta is zero.
    #[error("No money changes hands; nothing to settle")]
    NothingToSettle,

    /// Due collection only applies to bills without payments.
    #[error("Bill {bill_number} has recorded payments; no due to collect")]
    NotPayLater { bill_number: String },

    /// Branch not among the transfer source options.
    #[error("Branch {0} cannot supply this product")]
    SourceNotAvailable(i64),

    /// Source branch stock dropped below the requested quantity.
    #[error("{branch} now holds only {available}, requested {requested}")]
    StockChanged {
        branch: String,
        available: i64,
        requested: i64,
    },

    /// Transfer is no longer pending.
    #[error("Transfer {id} is {status}, only pending transfers can be accepted or rejected")]
    TransferNotPending { id: i64, status: String },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any request is built.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Amount is out of range.
    #[error("{field} must be between {min} and {max}")]
    AmountOutOfRange { field: String, min: Money, max: Money },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Arithmetic left the representable range.
    #[error("{field} is too large")]
    Overflow { field: String },

    /// Invalid format (e.g., malformed amount or compound id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Split tender does not add up.
    ///
    /// ## User Workflow
    /// ```text
    /// Customer owes ₹100
    ///      │
    ///      ▼
    /// split cash ₹60 + upi ₹30
    ///      │
    ///      ▼
    /// SplitMismatch { expected: ₹100, actual: ₹90 }
    /// ```
    #[error("Cash + UPI must equal {expected} (got {actual})")]
    SplitMismatch { expected: Money, actual: Money },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with FlowError.
pub type FlowResult<T> = Result<T, FlowError>;

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
