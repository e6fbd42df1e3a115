//! Return draft.
//!
//! ```text
//! idle ──► QuantitySet ──► PaymentMethodChosen ──► StockDecisionChosen ──► submitted
//!              │                                          ▲
//!              └──────── pay-later bill (no refund) ──────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{FlowError, FlowResult, ValidationError};
use crate::money::Money;
use crate::pricing;
use crate::requests::ReturnRequest;
use crate::types::{Bill, BillItem, RefundMethod, StockDestination};
use crate::validation::{clamp_quantity, validate_return_quantity, ValidationResult};

/// How far a return has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStage {
    QuantitySet,
    PaymentMethodChosen,
    StockDecisionChosen,
}

/// A return being prepared for one bill line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnDraft {
    bill_id: i64,
    bill_number: String,
    is_pay_later: bool,
    item: BillItem,
    quantity: i64,
    refund_method: Option<RefundMethod>,
    destination: Option<StockDestination>,
}

impl ReturnDraft {
    /// Opens a return with quantity 1.
    pub fn new(bill: &Bill, item: &BillItem) -> Self {
        ReturnDraft {
            bill_id: bill.id,
            bill_number: bill.bill_number.clone(),
            is_pay_later: bill.is_pay_later,
            item: item.clone(),
            quantity: 1,
            refund_method: None,
            destination: None,
        }
    }

    pub fn item(&self) -> &BillItem {
        &self.item
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn refund_method(&self) -> Option<RefundMethod> {
        self.refund_method
    }

    pub fn destination(&self) -> Option<StockDestination> {
        self.destination
    }

    /// Whether a refund method must be chosen. Pay-later bills skip it.
    pub fn needs_refund_method(&self) -> bool {
        !self.is_pay_later
    }

    /// Sets the quantity, clamped to `[1, remaining]`. Returns the stored value.
    pub fn set_quantity(&mut self, qty: i64) -> i64 {
        self.quantity = clamp_quantity(qty, self.item.remaining_qty());
        self.quantity
    }

    pub fn set_refund_method(&mut self, method: RefundMethod) -> FlowResult<()> {
        if self.is_pay_later {
            return Err(FlowError::NoRefundOnPayLater {
                bill_number: self.bill_number.clone(),
            });
        }
        self.refund_method = Some(method);
        Ok(())
    }

    pub fn set_destination(&mut self, destination: StockDestination) {
        self.destination = Some(destination);
    }

    /// Ledger value of the returned units. On a pay-later bill nothing is
    /// handed back; the backend reduces the due instead.
    pub fn refund_amount(&self) -> ValidationResult<Money> {
        pricing::return_refund(&self.item, self.quantity)
    }

    pub fn stage(&self) -> ReturnStage {
        let paid_step_done = self.is_pay_later || self.refund_method.is_some();
        match (paid_step_done, self.destination) {
            (true, Some(_)) => ReturnStage::StockDecisionChosen,
            (true, None) => ReturnStage::PaymentMethodChosen,
            (false, _) => ReturnStage::QuantitySet,
        }
    }

    /// Validates the draft and builds the request body.
    pub fn build_request(&self) -> FlowResult<ReturnRequest> {
        validate_return_quantity(self.quantity, self.item.remaining_qty())?;

        let refund_method = if self.is_pay_later {
            None
        } else {
            Some(
                self.refund_method
                    .ok_or_else(|| ValidationError::required("refund method"))?,
            )
        };
        let destination = self
            .destination
            .ok_or_else(|| ValidationError::required("stock disposition"))?;

        let amount = self.refund_amount()?;
        Ok(ReturnRequest {
            bill_id: self.bill_id,
            item_id: self.item.id,
            quantity: self.quantity,
            refund_method,
            refund_amount: amount,
            cash_amount: (refund_method == Some(RefundMethod::Cash)).then_some(amount),
            online_amount: (refund_method == Some(RefundMethod::Online)).then_some(amount),
            destination,
        })
    }
}
