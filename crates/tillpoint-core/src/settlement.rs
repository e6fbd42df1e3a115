//! # Settlement
//!
//! Turns a replacement [`Balance`] plus the cashier's tender choice into the
//! `payment` or `refund` object the replace endpoint expects.
//!
//! ## Rules
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ Balance          │ Accepted tender                                      │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ CustomerPays(d)  │ cash d │ upi d │ split cash + upi == d (exactly)     │
//! │ RefundDue(d)     │ cash d │ upi d          (split refused)              │
//! │ Even             │ nothing (settling is an error)                       │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{FlowError, FlowResult, ValidationError};
use crate::money::{decimal, Money};
use crate::pricing::Balance;
use crate::types::PaymentMethod;

/// Tender the cashier picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SettlementMethod {
    Cash,
    Upi,
    Split { cash: Money, upi: Money },
}

impl SettlementMethod {
    pub fn kind(&self) -> PaymentMethod {
        match self {
            SettlementMethod::Cash => PaymentMethod::Cash,
            SettlementMethod::Upi => PaymentMethod::Upi,
            SettlementMethod::Split { .. } => PaymentMethod::Split,
        }
    }
}

/// Money collected from the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentPayload {
    pub method: PaymentMethod,
    #[serde(with = "decimal")]
    #[ts(as = "String")]
    pub amount: Money,
    #[serde(
        with = "decimal::option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    #[ts(as = "Option<String>")]
    pub cash_amount: Option<Money>,
    #[serde(
        with = "decimal::option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    #[ts(as = "Option<String>")]
    pub upi_amount: Option<Money>,
}

/// Money handed back to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundPayload {
    pub method: PaymentMethod,
    #[serde(with = "decimal")]
    #[ts(as = "String")]
    pub amount: Money,
}

/// A validated settlement, ready for the replace request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Payment(PaymentPayload),
    Refund(RefundPayload),
}

impl Settlement {
    pub fn amount(&self) -> Money {
        match self {
            Settlement::Payment(p) => p.amount,
            Settlement::Refund(r) => r.amount,
        }
    }
}

/// Checks that split parts are non-negative and returns their sum.
pub(crate) fn split_total(cash: Money, upi: Money) -> Result<Money, ValidationError> {
    if cash.is_negative() || upi.is_negative() {
        return Err(ValidationError::InvalidFormat {
            field: "split amounts".to_string(),
            reason: "cash and UPI parts cannot be negative".to_string(),
        });
    }
    Ok(cash + upi)
}

/// Validates a tender against the balance and builds the payload.
pub fn settle(balance: Balance, method: SettlementMethod) -> FlowResult<Settlement> {
    match balance {
        Balance::Even => Err(FlowError::NothingToSettle),

        Balance::CustomerPays(due) => {
            let payload = match method {
                SettlementMethod::Cash => PaymentPayload {
                    method: PaymentMethod::Cash,
                    amount: due,
                    cash_amount: Some(due),
                    upi_amount: None,
                },
                SettlementMethod::Upi => PaymentPayload {
                    method: PaymentMethod::Upi,
                    amount: due,
                    cash_amount: None,
                    upi_amount: Some(due),
                },
                SettlementMethod::Split { cash, upi } => {
                    let total = split_total(cash, upi)?;
                    if total != due {
                        return Err(ValidationError::SplitMismatch {
                            expected: due,
                            actual: total,
                        }
                        .into());
                    }
                    PaymentPayload {
                        method: PaymentMethod::Split,
                        amount: due,
                        cash_amount: Some(cash),
                        upi_amount: Some(upi),
                    }
                }
            };
            Ok(Settlement::Payment(payload))
        }

        Balance::RefundDue(owed) => {
            let method = match method {
                SettlementMethod::Cash => PaymentMethod::Cash,
                SettlementMethod::Upi => PaymentMethod::Upi,
                SettlementMethod::Split { .. } => {
                    return Err(ValidationError::NotAllowed {
                        field: "refund method".to_string(),
                        allowed: vec!["cash".to_string(), "upi".to_string()],
                    }
                    .into());
                }
            };
            Ok(Settlement::Refund(RefundPayload {
                method,
                amount: owed,
            }))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
