//! # Validation Module
//!
//! Input checks that run before any request is built or sent.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console parser (apps/desk)                                   │
//! │  ├── Token shape (is it a number? a known keyword?)                    │
//! │  └── Usage hints                                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + workflow drafts                                │
//! │  ├── Query length, quantity bounds, discount bounds                    │
//! │  └── Raised locally, no network call made                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Final arbiter for stock, ledger and permissions                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tillpoint_core::validation::{validate_search_query, validate_return_quantity};
//!
//! assert_eq!(validate_search_query("  INV-1042 ").unwrap(), "INV-1042");
//! assert!(validate_search_query("   ").is_err());
//! assert!(validate_return_quantity(3, 2).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::DiscountRate;
use crate::MAX_QUERY_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a search query (bill or product).
///
/// ## Rules
/// - Whitespace-only input is rejected
/// - Maximum 100 characters after trimming
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.is_empty() {
        return Err(ValidationError::required("search query"));
    }

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "search query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates a replacement serial number and returns it trimmed.
pub fn validate_serial_number(serial: &str) -> ValidationResult<String> {
    let serial = serial.trim();

    if serial.is_empty() {
        return Err(ValidationError::required("new serial number"));
    }

    if serial.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "new serial number".to_string(),
            max: 100,
        });
    }

    Ok(serial.to_string())
}

/// Validates login credentials are present.
pub fn validate_credentials(username: &str, password: &str) -> ValidationResult<()> {
    if username.trim().is_empty() {
        return Err(ValidationError::required("username"));
    }
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a return or replacement quantity against what is left on the line.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Bill #1042: Fan ×3, returned 1 → remaining 2                          │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_return_quantity(qty, 2) ← THIS FUNCTION                      │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 2?  → Error: "quantity must be between 1 and 2"        │
/// │       │                                                                 │
/// │       └── OK → build the return payload                                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_return_quantity(qty: i64, remaining: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > remaining {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: remaining,
        });
    }

    Ok(())
}

/// Validates a transfer quantity against a source branch's holding.
pub fn validate_transfer_quantity(qty: i64, available: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "transfer quantity".to_string(),
        });
    }

    if qty > available {
        return Err(ValidationError::OutOfRange {
            field: "transfer quantity".to_string(),
            min: 1,
            max: available,
        });
    }

    Ok(())
}

/// Validates a percentage discount in basis points (0 to 10000).
pub fn validate_discount_rate(rate: DiscountRate) -> ValidationResult<()> {
    if rate.bps() > DiscountRate::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount percentage".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

/// Validates a fixed discount. Negative amounts are refused; amounts above
/// the line total are capped later, not rejected.
pub fn validate_fixed_discount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::AmountOutOfRange {
            field: "discount amount".to_string(),
            min: Money::zero(),
            max: Money::from_paise(i64::MAX),
        });
    }
    Ok(())
}

/// Validates a single tender amount is strictly positive.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Clamp Helpers
// =============================================================================

/// Clamps a typed quantity into `[1, max]`.
///
/// Used by the drafts so a cashier typing 5 on a line with 2 left ends up
/// with 2 instead of an error. Submission still re-validates.
#[inline]
pub fn clamp_quantity(qty: i64, max: i64) -> i64 {
    qty.clamp(1, max.max(1))
}

// =============================================================================
// Unit Tests
// =============================================================================
