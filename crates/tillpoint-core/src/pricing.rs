//! # Pricing
//!
//! Refund and replacement arithmetic. Everything here is integer paise.
//!
//! ## Replacement Delta
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Original line (what the customer paid)                                 │
//! │    per_unit_paid  = final_amount > 0 ? final_amount / quantity          │
//! │                                      : unit_price                       │
//! │    original_paid  = final_amount × qty / quantity   (half-up, paisa)    │
//! │                                                                         │
//! │  New product (what the customer takes home)                             │
//! │    new_total      = selling_price × qty                                 │
//! │    discount       = pct ? new_total × pct / 100                         │
//! │                         : min(fixed, new_total)                         │
//! │    discounted     = new_total - discount                                │
//! │                                                                         │
//! │  delta = discounted - original_paid                                     │
//! │    > 0  customer pays delta                                             │
//! │    < 0  refund |delta|                                                  │
//! │    = 0  nothing moves                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `original_paid` multiplies before dividing so a line of 3 units paid
//! ₹1000 refunds ₹1000 for all three, not 3 × ₹333.33.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{BillItem, CandidateProduct, Discount};
use crate::validation::ValidationResult;

// =============================================================================
// Returns
// =============================================================================

/// Refund owed for returning `qty` units of a line.
///
/// Uses the ledger unit price. Bill-level discounts are not re-derived here.
#[inline]
pub fn return_refund(item: &BillItem, qty: i64) -> ValidationResult<Money> {
    item.unit_price.multiply_quantity(qty)
}

// =============================================================================
// Replacements
// =============================================================================

/// What the customer actually paid per unit of the original line.
pub fn per_unit_paid(item: &BillItem) -> Money {
    if item.final_amount.is_positive() && item.quantity > 0 {
        item.final_amount.mul_div_round(1, item.quantity)
    } else {
        item.unit_price
    }
}

/// What the customer paid for `qty` units of the original line.
pub fn original_paid(item: &BillItem, qty: i64) -> ValidationResult<Money> {
    if item.final_amount.is_positive() && item.quantity > 0 {
        Ok(item.final_amount.mul_div_round(qty, item.quantity))
    } else {
        item.unit_price.multiply_quantity(qty)
    }
}

/// Discount taken off a new line total. Fixed discounts never exceed it.
pub fn discount_amount(new_total: Money, discount: Option<&Discount>) -> Money {
    match discount {
        None => Money::zero(),
        Some(Discount::Percentage(rate)) => new_total.percentage(*rate).min(new_total),
        Some(Discount::Fixed(amount)) => (*amount).clamp(Money::zero(), new_total),
    }
}

/// Which way money moves once a replacement is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "direction", content = "amount", rename_all = "snake_case")]
pub enum Balance {
    /// Customer owes this much.
    CustomerPays(Money),
    /// Customer is refunded this much.
    RefundDue(Money),
    /// No money changes hands.
    Even,
}

impl Balance {
    /// Classifies a signed delta.
    pub fn from_delta(delta: Money) -> Self {
        if delta.is_positive() {
            Balance::CustomerPays(delta)
        } else if delta.is_negative() {
            Balance::RefundDue(delta.abs())
        } else {
            Balance::Even
        }
    }

    /// Unsigned amount to settle (zero when even).
    pub fn amount(&self) -> Money {
        match self {
            Balance::CustomerPays(m) | Balance::RefundDue(m) => *m,
            Balance::Even => Money::zero(),
        }
    }
}

/// Full price breakdown of a dissatisfaction replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReplacementQuote {
    pub quantity: i64,
    pub original_paid: Money,
    pub new_product_total: Money,
    pub discount_amount: Money,
    pub discounted_new_total: Money,
    /// Signed: positive means the customer pays.
    pub delta: Money,
}

impl ReplacementQuote {
    pub fn balance(&self) -> Balance {
        Balance::from_delta(self.delta)
    }
}

/// Prices replacing `qty` units of `item` with `product`.
///
/// ## Example
/// ```rust
/// use tillpoint_core::pricing::{quote, Balance};
/// use tillpoint_core::{BillItem, CandidateProduct, Discount, DiscountRate, Money};
///
/// let item = BillItem {
///     id: 1, product_id: 10, name: "Kettle".into(), model: None,
///     quantity: 1, unit_price: Money::from_rupees(850), returned_qty: 0,
///     is_returned: false, serial_number: None,
///     final_amount: Money::from_rupees(800), salesperson: None,
/// };
/// let product = CandidateProduct {
///     id: 20, name: "Kettle Pro".into(), model: None,
///     selling_price: Money::from_rupees(1000), stock_qty: 4,
/// };
/// let q = quote(&item, &product, 1, Some(&Discount::Percentage(DiscountRate::from_bps(1000)))).unwrap();
/// assert_eq!(q.balance(), Balance::CustomerPays(Money::from_rupees(100)));
/// ```
pub fn quote(
    item: &BillItem,
    product: &CandidateProduct,
    qty: i64,
    discount: Option<&Discount>,
) -> ValidationResult<ReplacementQuote> {
    let original = original_paid(item, qty)?;
    let new_total = product.selling_price.multiply_quantity(qty)?;
    let discount = discount_amount(new_total, discount);
    let discounted = new_total - discount;

    Ok(ReplacementQuote {
        quantity: qty,
        original_paid: original,
        new_product_total: new_total,
        discount_amount: discount,
        discounted_new_total: discounted,
        delta: discounted - original,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::item;
    use crate::types::DiscountRate;

    fn product(selling_rupees: i64) -> CandidateProduct {
        CandidateProduct {
            id: 77,
            name: "Blender X".to_string(),
            model: Some("BX-2".to_string()),
            selling_price: Money::from_rupees(selling_rupees),
            stock_qty: 5,
        }
    }

    fn paid_line(quantity: i64, unit_rupees: i64, final_rupees: i64) -> BillItem {
        let mut line = item(1, quantity, 0, unit_rupees);
        line.final_amount = Money::from_rupees(final_rupees);
        line
    }

    #[test]
    fn test_return_refund_uses_ledger_price() {
        let line = paid_line(3, 250, 600);
        assert_eq!(return_refund(&line, 2).unwrap(), Money::from_rupees(500));
    }

    #[test]
    fn test_percentage_discount_customer_pays() {
        let line = paid_line(1, 850, 800);
        let pct = Discount::Percentage(DiscountRate::from_bps(1000));
        let q = quote(&line, &product(1000), 1, Some(&pct)).unwrap();

        assert_eq!(q.discount_amount, Money::from_rupees(100));
        assert_eq!(q.discounted_new_total, Money::from_rupees(900));
        assert_eq!(q.delta, Money::from_rupees(100));
        assert_eq!(q.balance(), Balance::CustomerPays(Money::from_rupees(100)));
    }

    #[test]
    fn test_fixed_discount_caps_at_new_total() {
        let line = paid_line(1, 850, 800);
        let fixed = Discount::Fixed(Money::from_rupees(1500));
        let q = quote(&line, &product(1000), 1, Some(&fixed)).unwrap();

        assert_eq!(q.discount_amount, Money::from_rupees(1000));
        assert_eq!(q.discounted_new_total, Money::zero());
        assert_eq!(q.delta, Money::from_rupees(-800));
        assert_eq!(q.balance(), Balance::RefundDue(Money::from_rupees(800)));
    }

    #[test]
    fn test_falls_back_to_unit_price_without_final_amount() {
        let line = paid_line(2, 400, 0);
        assert_eq!(per_unit_paid(&line), Money::from_rupees(400));
        assert_eq!(original_paid(&line, 2).unwrap(), Money::from_rupees(800));

        let q = quote(&line, &product(400), 1, None).unwrap();
        assert_eq!(q.balance(), Balance::Even);
    }

    #[test]
    fn test_original_paid_multiplies_before_dividing() {
        let line = paid_line(3, 400, 1000);
        assert_eq!(per_unit_paid(&line), Money::from_paise(33_333));
        assert_eq!(original_paid(&line, 3).unwrap(), Money::from_rupees(1000));
        assert_eq!(original_paid(&line, 1).unwrap(), Money::from_paise(33_333));
        assert_eq!(original_paid(&line, 2).unwrap(), Money::from_paise(66_667));
    }

    #[test]
    fn test_oversized_price_is_rejected() {
        let line = paid_line(1, 850, 800);
        let mut huge = product(0);
        huge.selling_price = Money::from_paise(i64::MAX / 2 + 1);
        assert!(quote(&line, &huge, 2, None).is_err());
        assert!(quote(&line, &huge, 1, None).is_ok());

        let mut line = paid_line(3, 0, 0);
        line.unit_price = Money::from_paise(i64::MAX / 2);
        assert!(return_refund(&line, 3).is_err());
    }

    #[test]
    fn test_full_percentage_discount() {
        let new_total = Money::from_rupees(999);
        let all = Discount::Percentage(DiscountRate::from_bps(10_000));
        assert_eq!(discount_amount(new_total, Some(&all)), new_total);
        assert_eq!(discount_amount(new_total, None), Money::zero());
    }
}
