//! # Domain Types
//!
//! Client-side projections of the records the backend owns.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Bill       │   │    BillItem     │   │  BillPayment    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  id             │   │  method         │       │
//! │  │  bill_number    │   │  quantity       │   │  amount         │       │
//! │  │  customer       │   │  returned_qty   │   └─────────────────┘       │
//! │  │  is_pay_later   │   │  unit_price     │                             │
//! │  └─────────────────┘   │  final_amount   │                             │
//! │                        └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │CandidateProduct │   │ TransferRequest │   │ Rack/StockItem  │       │
//! │  │  selling_price  │   │  status         │   │  allocation     │       │
//! │  │  stock_qty      │   │  from/to branch │   │  view           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Every record is created server-side. The client fetches a representation,
//! submits a mutation, and re-fetches. Nothing here is persisted locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// Percentage discount in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%, so 1250 bps = 12.5%. Cashiers type percentages
/// with up to two decimals; bps keeps them exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// 100% in basis points.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Parses a typed percentage such as `"10"` or `"12.5"`.
    ///
    /// Accepts 0 to 100 with at most two decimal places.
    pub fn parse_percentage(raw: &str) -> Result<Self, ValidationError> {
        // Basis points hold two decimals; a third would be rounded away.
        if raw
            .trim()
            .split_once('.')
            .is_some_and(|(_, fraction)| fraction.len() > 2)
        {
            return Err(ValidationError::InvalidFormat {
                field: "discount percentage".to_string(),
                reason: format!("at most two decimal places: {raw:?}"),
            });
        }
        let as_money = Money::parse_decimal(raw).map_err(|_| ValidationError::InvalidFormat {
            field: "discount percentage".to_string(),
            reason: format!("not a number: {raw:?}"),
        })?;
        // A percentage parses like an amount: "12.5" -> 1250 hundredths.
        let bps = as_money.paise();
        if !(0..=Self::MAX_BPS as i64).contains(&bps) {
            return Err(ValidationError::OutOfRange {
                field: "discount percentage".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(DiscountRate(bps as u32))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Decimal percentage string for the wire (`"12.50"`).
    pub fn to_decimal_string(&self) -> String {
        Money::from_paise(self.0 as i64).to_decimal_string()
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.to_decimal_string())
    }
}

/// Discount applied to the new product's line total in a dissatisfaction
/// replacement. Never applied to the original item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the new line total (0-100%).
    Percentage(DiscountRate),
    /// Fixed amount, capped at the new line total when applied.
    Fixed(Money),
}

impl Discount {
    /// Wire name of the discount type.
    pub fn kind(&self) -> DiscountType {
        match self {
            Discount::Percentage(_) => DiscountType::Percentage,
            Discount::Fixed(_) => DiscountType::Fixed,
        }
    }

    /// Wire value of the discount as a decimal string.
    pub fn value_string(&self) -> String {
        match self {
            Discount::Percentage(rate) => rate.to_decimal_string(),
            Discount::Fixed(amount) => amount.to_decimal_string(),
        }
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discount::Percentage(rate) => write!(f, "{rate}"),
            Discount::Fixed(amount) => write!(f, "{amount}"),
        }
    }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Declares a snake_case wire enum with `Display` and `FromStr`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
        #[ts(export)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Wire representation.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text $(| $alias)* => Ok($name::$variant),)+
                    _ => Err(ValidationError::NotAllowed {
                        field: $label.to_string(),
                        allowed: vec![$($text.to_string()),+],
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// How a return refund is paid out.
    RefundMethod, "refund method" {
        /// Cash from the drawer.
        Cash => "cash",
        /// UPI / bank transfer.
        Online => "online" | "upi",
    }
}

wire_enum! {
    /// Where a returned or replaced unit goes.
    ///
    /// Always asked, return or replace, regardless of payment path.
    StockDestination, "stock disposition" {
        /// Back into sellable inventory.
        Stock => "stock" | "restock",
        /// Routed back to the supplying vendor.
        Vendor => "vendor",
    }
}

wire_enum! {
    /// Replacement sub-type, chosen once per replacement.
    ReplacementType, "replacement type" {
        /// Same product, defective unit swapped, no money.
        Warranty => "warranty",
        /// Different product, price delta settled.
        Dissatisfaction => "dissatisfaction",
    }
}

wire_enum! {
    /// Discount kind on the wire.
    DiscountType, "discount type" {
        Percentage => "percentage" | "percent" | "%",
        Fixed => "fixed" | "amount",
    }
}

wire_enum! {
    /// Tender for collecting money from a customer.
    PaymentMethod, "payment method" {
        Cash => "cash",
        Upi => "upi" | "online",
        /// Cash and UPI together.
        Split => "split",
    }
}

wire_enum! {
    /// Lifecycle of an inter-branch transfer. Set only by the backend.
    TransferStatus, "transfer status" {
        Pending => "pending",
        Approved => "approved" | "accepted",
        Rejected => "rejected",
        Completed => "completed",
    }
}

wire_enum! {
    /// Decision a receiving branch sends for a pending transfer.
    TransferAction, "transfer action" {
        Accept => "accept",
        Reject => "reject",
    }
}

// =============================================================================
// Bill
// =============================================================================

/// Customer snapshot on a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub name: String,
    pub phone: Option<String>,
    /// Outstanding balance across the customer's account.
    pub due_balance: Money,
}

/// A payment recorded against a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillPayment {
    pub method: String,
    pub amount: Money,
}

/// A line item on a bill.
///
/// ## Invariant
/// `returned_qty <= quantity`. Decoders reject records that violate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillItem {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub model: Option<String>,
    pub quantity: i64,
    /// Ledger list price per unit.
    pub unit_price: Money,
    pub returned_qty: i64,
    pub is_returned: bool,
    pub serial_number: Option<String>,
    /// Amount actually paid for the whole line, after bill discounts.
    /// Zero when the backend did not record it.
    pub final_amount: Money,
    pub salesperson: Option<String>,
}

impl BillItem {
    /// Quantity still eligible for return or replacement.
    #[inline]
    pub fn remaining_qty(&self) -> i64 {
        (self.quantity - self.returned_qty).max(0)
    }

    /// Only items with remaining quantity can be acted on.
    #[inline]
    pub fn is_selectable(&self) -> bool {
        self.quantity > self.returned_qty
    }

    /// Returns the serial number if the item carries a non-blank one.
    pub fn serial(&self) -> Option<&str> {
        self.serial_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A completed or pending sale record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bill {
    pub id: i64,
    pub bill_number: String,
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
    pub customer: Customer,
    pub items: Vec<BillItem>,
    pub payments: Vec<BillPayment>,
    pub final_amount: Money,
    /// True iff no payment records exist.
    pub is_pay_later: bool,
}

impl Bill {
    /// Items with remaining quantity.
    pub fn selectable_items(&self) -> impl Iterator<Item = &BillItem> {
        self.items.iter().filter(|i| i.is_selectable())
    }

    /// Finds an item by id.
    pub fn item(&self, item_id: i64) -> Option<&BillItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Total of recorded payments.
    pub fn paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Amount still owed on this bill.
    pub fn due_amount(&self) -> Money {
        (self.final_amount - self.paid()).clamp(Money::zero(), self.final_amount)
    }
}

// =============================================================================
// Products & Branches
// =============================================================================

/// A product offered as a dissatisfaction replacement. Ephemeral search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CandidateProduct {
    pub id: i64,
    pub name: String,
    pub model: Option<String>,
    pub selling_price: Money,
    pub stock_qty: i64,
}

/// How much of a product one branch holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BranchStock {
    pub branch_id: i64,
    pub branch_name: String,
    pub quantity: i64,
}

// =============================================================================
// Transfers
// =============================================================================

/// An inter-branch stock movement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferRequest {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub from_branch: String,
    pub to_branch: String,
    pub quantity: i64,
    pub status: TransferStatus,
    pub notes: Option<String>,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TransferRequest {
    /// Only pending requests can be accepted or rejected.
    #[inline]
    pub fn is_actionable(&self) -> bool {
        self.status == TransferStatus::Pending
    }
}

// =============================================================================
// Racks & Stock Allocation
// =============================================================================

/// A named allocation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rack {
    pub id: i64,
    pub name: String,
}

/// Compound identity of a stock allocation row: `productId-quantityRecordId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct StockItemId {
    pub product_id: i64,
    pub quantity_record_id: i64,
}

impl fmt::Display for StockItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.product_id, self.quantity_record_id)
    }
}

impl FromStr for StockItemId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "stock item id".to_string(),
            reason: format!("expected productId-quantityRecordId, got {s:?}"),
        };
        let (product, record) = s.trim().split_once('-').ok_or_else(invalid)?;
        Ok(StockItemId {
            product_id: product.parse().map_err(|_| invalid())?,
            quantity_record_id: record.parse().map_err(|_| invalid())?,
        })
    }
}

impl From<StockItemId> for String {
    fn from(id: StockItemId) -> String {
        id.to_string()
    }
}

impl TryFrom<String> for StockItemId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Allocation view of a stock row. Re-derived on every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockItem {
    #[ts(as = "String")]
    pub id: StockItemId,
    pub product_name: String,
    pub quantity: i64,
    pub rack_id: Option<i64>,
    pub rack_name: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
