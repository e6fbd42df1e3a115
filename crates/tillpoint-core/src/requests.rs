//! # Request Payloads
//!
//! Bodies of every mutating call. Built by the workflow drafts after all
//! local validation has passed, then handed to the client unchanged.
//!
//! Amounts go out as decimal strings (`"800.00"`), ids as integers.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{decimal, Money};
use crate::settlement::{PaymentPayload, RefundPayload};
use crate::types::{
    DiscountType, PaymentMethod, RefundMethod, ReplacementType, StockDestination, StockItemId,
    TransferAction,
};

// =============================================================================
// Returns
// =============================================================================

/// `POST /api/pos/bill/return/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReturnRequest {
    pub bill_id: i64,
    pub item_id: i64,
    pub quantity: i64,
    /// Absent on pay-later bills.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub refund_method: Option<RefundMethod>,
    #[serde(with = "decimal")]
    #[ts(as = "String")]
    pub refund_amount: Money,
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
    pub online_amount: Option<Money>,
    pub destination: StockDestination,
}

// =============================================================================
// Replacements
// =============================================================================

/// One line of a replacement.
///
/// Warranty lines carry serial fields; dissatisfaction lines carry the new
/// product and its price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReplacementItem {
    pub bill_item_id: i64,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub old_serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_product_id: Option<i64>,
    /// Discounted line total of the new product.
    #[serde(
        with = "decimal::option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    #[ts(as = "Option<String>")]
    pub new_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub discount_type: Option<DiscountType>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub discount_value: Option<String>,
}

/// `POST /api/pos/replace/create/`
///
/// At most one of `payment` and `refund` is present; neither when the
/// replacement is price-neutral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReplacementRequest {
    pub bill_id: i64,
    pub replacement_type: ReplacementType,
    pub destination: StockDestination,
    pub items: Vec<ReplacementItem>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payment: Option<PaymentPayload>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub refund: Option<RefundPayload>,
}

// =============================================================================
// Transfers
// =============================================================================

/// `POST /api/pos/transfers/create/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferCreateRequest {
    pub product_id: i64,
    pub from_branch_id: i64,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
}

/// `POST /api/pos/transfer/update/{id}/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferUpdateRequest {
    pub action: TransferAction,
}

// =============================================================================
// Dues
// =============================================================================

/// `POST /api/pos/due/update/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DueUpdateRequest {
    pub bill_id: i64,
    pub payment_method: PaymentMethod,
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

// =============================================================================
// Stock Allocation
// =============================================================================

/// `POST /api/pos/stock/allocate/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AllocateRequest {
    pub product_id: i64,
    pub quantity_record_id: i64,
    pub rack_id: i64,
}

impl AllocateRequest {
    pub fn new(item: StockItemId, rack_id: i64) -> Self {
        AllocateRequest {
            product_id: item.product_id,
            quantity_record_id: item.quantity_record_id,
            rack_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_request_omits_absent_refund() {
        let req = ReturnRequest {
            bill_id: 5,
            item_id: 9,
            quantity: 1,
            refund_method: None,
            refund_amount: Money::from_rupees(250),
            cash_amount: None,
            online_amount: None,
            destination: StockDestination::Vendor,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["destination"], "vendor");
        assert_eq!(json["refund_amount"], "250.00");
        assert!(json.get("refund_method").is_none());
        assert!(json.get("cash_amount").is_none());
    }

    #[test]
    fn test_allocate_request_from_compound_id() {
        let id: StockItemId = "12-340".parse().unwrap();
        let req = AllocateRequest::new(id, 3);
        assert_eq!(req.product_id, 12);
        assert_eq!(req.quantity_record_id, 340);
        assert_eq!(req.rack_id, 3);
    }
}
