//! # Replacement Draft
//!
//! Warranty swaps and dissatisfaction exchanges for one bill line.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  choose_type (once)                                                     │
//! │      │                                                                  │
//! │      ├── Warranty ─────────► serial (if original has one) ──┐          │
//! │      │                                                       │          │
//! │      └── Dissatisfaction ──► find ► pick ► discount? ────────┤          │
//! │                                                              ▼          │
//! │                                                   destination (always)  │
//! │                                                              │          │
//! │                                      delta != 0 ? settle ◄───┘          │
//! │                                                              │          │
//! │                                                              ▼          │
//! │                                                         build_request   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Anything that moves the delta (quantity, product, discount) drops an
//! already recorded settlement so a stale amount is never submitted.

use crate::error::{FlowError, FlowResult, ValidationError};
use crate::pricing::{self, Balance, ReplacementQuote};
use crate::requests::{ReplacementItem, ReplacementRequest};
use crate::settlement::{self, Settlement, SettlementMethod};
use crate::types::{
    Bill, BillItem, CandidateProduct, Discount, ReplacementType, StockDestination,
};
use crate::validation::{
    clamp_quantity, validate_discount_rate, validate_fixed_discount, validate_return_quantity,
    validate_serial_number, ValidationResult,
};

/// Sub-type specific state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementKind {
    Warranty {
        new_serial: Option<String>,
    },
    Dissatisfaction {
        /// Latest product search results; replaced on every search.
        candidates: Vec<CandidateProduct>,
        /// Locked-in replacement product.
        product: Option<CandidateProduct>,
        discount: Option<Discount>,
        settlement: Option<Settlement>,
    },
}

impl ReplacementKind {
    fn replacement_type(&self) -> ReplacementType {
        match self {
            ReplacementKind::Warranty { .. } => ReplacementType::Warranty,
            ReplacementKind::Dissatisfaction { .. } => ReplacementType::Dissatisfaction,
        }
    }
}

/// A replacement being prepared for one bill line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementDraft {
    bill_id: i64,
    item: BillItem,
    quantity: i64,
    kind: Option<ReplacementKind>,
    destination: Option<StockDestination>,
}

impl ReplacementDraft {
    pub fn new(bill: &Bill, item: &BillItem) -> Self {
        ReplacementDraft {
            bill_id: bill.id,
            item: item.clone(),
            quantity: 1,
            kind: None,
            destination: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn item(&self) -> &BillItem {
        &self.item
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn destination(&self) -> Option<StockDestination> {
        self.destination
    }

    pub fn kind(&self) -> Option<&ReplacementKind> {
        self.kind.as_ref()
    }

    pub fn replacement_type(&self) -> Option<ReplacementType> {
        self.kind.as_ref().map(ReplacementKind::replacement_type)
    }

    /// A warranty swap of a serial-numbered unit needs the new serial.
    pub fn requires_new_serial(&self) -> bool {
        self.item.serial().is_some()
    }

    pub fn candidates(&self) -> &[CandidateProduct] {
        match &self.kind {
            Some(ReplacementKind::Dissatisfaction { candidates, .. }) => candidates,
            _ => &[],
        }
    }

    pub fn product(&self) -> Option<&CandidateProduct> {
        match &self.kind {
            Some(ReplacementKind::Dissatisfaction { product, .. }) => product.as_ref(),
            _ => None,
        }
    }

    pub fn discount(&self) -> Option<&Discount> {
        match &self.kind {
            Some(ReplacementKind::Dissatisfaction { discount, .. }) => discount.as_ref(),
            _ => None,
        }
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        match &self.kind {
            Some(ReplacementKind::Dissatisfaction { settlement, .. }) => settlement.as_ref(),
            _ => None,
        }
    }

    /// Current price breakdown, once a product is locked in.
    pub fn quote(&self) -> ValidationResult<Option<ReplacementQuote>> {
        match &self.kind {
            Some(ReplacementKind::Dissatisfaction {
                product: Some(product),
                discount,
                ..
            }) => pricing::quote(&self.item, product, self.quantity, discount.as_ref()).map(Some),
            _ => Ok(None),
        }
    }

    pub fn balance(&self) -> ValidationResult<Option<Balance>> {
        Ok(self.quote()?.map(|q| q.balance()))
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Picks the sub-type. Allowed exactly once.
    pub fn choose_type(&mut self, replacement_type: ReplacementType) -> FlowResult<()> {
        if let Some(kind) = &self.kind {
            return Err(FlowError::ReplacementTypeLocked(
                kind.replacement_type().as_str(),
            ));
        }
        self.kind = Some(match replacement_type {
            ReplacementType::Warranty => ReplacementKind::Warranty { new_serial: None },
            ReplacementType::Dissatisfaction => ReplacementKind::Dissatisfaction {
                candidates: Vec::new(),
                product: None,
                discount: None,
                settlement: None,
            },
        });
        Ok(())
    }

    /// Sets the quantity, clamped to `[1, remaining]`.
    pub fn set_quantity(&mut self, qty: i64) -> i64 {
        let clamped = clamp_quantity(qty, self.item.remaining_qty());
        if clamped != self.quantity {
            self.quantity = clamped;
            self.clear_settlement();
        }
        self.quantity
    }

    pub fn set_destination(&mut self, destination: StockDestination) {
        self.destination = Some(destination);
    }

    /// Records the scanned serial of the replacement unit.
    pub fn set_new_serial(&mut self, serial: &str) -> FlowResult<()> {
        let serial = validate_serial_number(serial)?;
        match &mut self.kind {
            Some(ReplacementKind::Warranty { new_serial }) => {
                *new_serial = Some(serial);
                Ok(())
            }
            _ => Err(FlowError::WrongReplacementType("warranty")),
        }
    }

    /// Stores product search results, replacing the previous ones.
    pub fn apply_candidates(&mut self, results: Vec<CandidateProduct>) -> FlowResult<()> {
        let candidates = self.dissatisfaction_candidates_mut()?;
        *candidates = results;
        Ok(())
    }

    /// Locks a product from the latest results.
    pub fn select_product(&mut self, product_id: i64) -> FlowResult<()> {
        let Some(ReplacementKind::Dissatisfaction {
            candidates,
            product,
            settlement,
            ..
        }) = &mut self.kind
        else {
            return Err(FlowError::WrongReplacementType("dissatisfaction"));
        };

        if let Some(locked) = product {
            return Err(FlowError::ProductLocked(locked.name.clone()));
        }
        let chosen = candidates
            .iter()
            .find(|c| c.id == product_id)
            .cloned()
            .ok_or(FlowError::ProductNotListed(product_id))?;

        *product = Some(chosen);
        *candidates = Vec::new();
        *settlement = None;
        Ok(())
    }

    /// Unlocks the product so another can be picked.
    pub fn remove_product(&mut self) -> FlowResult<()> {
        let Some(ReplacementKind::Dissatisfaction {
            product,
            settlement,
            ..
        }) = &mut self.kind
        else {
            return Err(FlowError::WrongReplacementType("dissatisfaction"));
        };
        *product = None;
        *settlement = None;
        Ok(())
    }

    /// Applies or clears the discount on the new line.
    pub fn set_discount(&mut self, new_discount: Option<Discount>) -> FlowResult<()> {
        match &new_discount {
            Some(Discount::Percentage(rate)) => validate_discount_rate(*rate)?,
            Some(Discount::Fixed(amount)) => validate_fixed_discount(*amount)?,
            None => {}
        }
        let Some(ReplacementKind::Dissatisfaction {
            discount,
            settlement,
            ..
        }) = &mut self.kind
        else {
            return Err(FlowError::WrongReplacementType("dissatisfaction"));
        };
        *discount = new_discount;
        *settlement = None;
        Ok(())
    }

    /// Records the tender for the current balance.
    pub fn settle(&mut self, method: SettlementMethod) -> FlowResult<()> {
        let balance = self
            .balance()?
            .ok_or_else(|| ValidationError::required("replacement product"))?;
        let settled = settlement::settle(balance, method)?;
        if let Some(ReplacementKind::Dissatisfaction { settlement, .. }) = &mut self.kind {
            *settlement = Some(settled);
        }
        Ok(())
    }

    fn clear_settlement(&mut self) {
        if let Some(ReplacementKind::Dissatisfaction { settlement, .. }) = &mut self.kind {
            *settlement = None;
        }
    }

    fn dissatisfaction_candidates_mut(&mut self) -> FlowResult<&mut Vec<CandidateProduct>> {
        match &mut self.kind {
            Some(ReplacementKind::Dissatisfaction { candidates, .. }) => Ok(candidates),
            _ => Err(FlowError::WrongReplacementType("dissatisfaction")),
        }
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validates the draft and builds the request body.
    pub fn build_request(&self) -> FlowResult<ReplacementRequest> {
        let kind = self
            .kind
            .as_ref()
            .ok_or_else(|| ValidationError::required("replacement type"))?;
        validate_return_quantity(self.quantity, self.item.remaining_qty())?;
        let destination = self
            .destination
            .ok_or_else(|| ValidationError::required("stock disposition"))?;

        let (item, payment, refund) = match kind {
            ReplacementKind::Warranty { new_serial } => {
                let serials = match self.item.serial() {
                    Some(old) => {
                        let new = new_serial
                            .clone()
                            .ok_or_else(|| ValidationError::required("new serial number"))?;
                        Some((old.to_string(), new))
                    }
                    None => None,
                };
                let (old_serial_number, new_serial_number) = serials.unzip();
                let item = ReplacementItem {
                    bill_item_id: self.item.id,
                    quantity: self.quantity,
                    old_serial_number,
                    new_serial_number,
                    new_product_id: None,
                    new_price: None,
                    discount_type: None,
                    discount_value: None,
                };
                (item, None, None)
            }

            ReplacementKind::Dissatisfaction {
                product,
                discount,
                settlement,
                ..
            } => {
                let product = product
                    .as_ref()
                    .ok_or_else(|| ValidationError::required("replacement product"))?;
                let quote = pricing::quote(&self.item, product, self.quantity, discount.as_ref())?;

                let (payment, refund) = match (quote.balance(), settlement) {
                    (Balance::Even, _) => (None, None),
                    (Balance::CustomerPays(_), Some(Settlement::Payment(p))) => {
                        (Some(p.clone()), None)
                    }
                    (Balance::RefundDue(_), Some(Settlement::Refund(r))) => {
                        (None, Some(r.clone()))
                    }
                    (Balance::CustomerPays(_), _) => {
                        return Err(ValidationError::required("payment method").into())
                    }
                    (Balance::RefundDue(_), _) => {
                        return Err(ValidationError::required("refund method").into())
                    }
                };

                let item = ReplacementItem {
                    bill_item_id: self.item.id,
                    quantity: self.quantity,
                    old_serial_number: None,
                    new_serial_number: None,
                    new_product_id: Some(product.id),
                    new_price: Some(quote.discounted_new_total),
                    discount_type: discount.as_ref().map(Discount::kind),
                    discount_value: discount.as_ref().map(Discount::value_string),
                };
                (item, payment, refund)
            }
        };

        Ok(ReplacementRequest {
            bill_id: self.bill_id,
            replacement_type: kind.replacement_type(),
            destination,
            items: vec![item],
            payment,
            refund,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
