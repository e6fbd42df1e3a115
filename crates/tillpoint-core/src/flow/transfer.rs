//! # Transfer Draft
//!
//! Requesting stock of one product from another branch.
//!
//! ## Availability Checks
//! ```text
//! branch-stock fetch ──► set_sources   (drop own branch + empty branches)
//!                              │
//!                              ▼
//!                        select_source (clamp qty to available)
//!                              │
//!                              ▼
//! branch-stock re-fetch ─► revalidate  (reject if the source shrank)
//!                              │
//!                              ▼
//!                        build_request
//! ```
//! The backend still arbitrates; `revalidate` only narrows the window.

use crate::error::{FlowError, FlowResult, ValidationError};
use crate::requests::TransferCreateRequest;
use crate::types::BranchStock;
use crate::validation::validate_transfer_quantity;

/// A transfer request being prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDraft {
    product_id: i64,
    own_branch: Option<String>,
    sources: Vec<BranchStock>,
    source: Option<BranchStock>,
    quantity: i64,
    notes: Option<String>,
}

fn same_branch(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl TransferDraft {
    /// Starts a draft. `own_branch` is the session's branch name.
    pub fn new(product_id: i64, own_branch: Option<String>) -> Self {
        TransferDraft {
            product_id,
            own_branch,
            sources: Vec::new(),
            source: None,
            quantity: 1,
            notes: None,
        }
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn sources(&self) -> &[BranchStock] {
        &self.sources
    }

    pub fn source(&self) -> Option<&BranchStock> {
        self.source.as_ref()
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Whether a branch may supply this product.
    fn is_eligible(&self, stock: &BranchStock) -> bool {
        let own = self
            .own_branch
            .as_deref()
            .is_some_and(|own| same_branch(own, &stock.branch_name));
        stock.quantity > 0 && !own
    }

    /// Replaces the source options with a fresh branch-stock listing.
    ///
    /// A previously chosen source that is no longer eligible is dropped.
    pub fn set_sources(&mut self, stocks: Vec<BranchStock>) {
        self.sources = stocks.into_iter().filter(|s| self.is_eligible(s)).collect();
        if let Some(chosen) = &self.source {
            if !self.sources.iter().any(|s| s.branch_id == chosen.branch_id) {
                self.source = None;
            }
        }
    }

    /// Picks the supplying branch and clamps the quantity to its stock.
    pub fn select_source(&mut self, branch_id: i64) -> FlowResult<()> {
        let chosen = self
            .sources
            .iter()
            .find(|s| s.branch_id == branch_id)
            .cloned()
            .ok_or(FlowError::SourceNotAvailable(branch_id))?;
        self.quantity = self.quantity.clamp(1, chosen.quantity);
        self.source = Some(chosen);
        Ok(())
    }

    /// Sets the quantity, clamped to the chosen source's stock if any.
    pub fn set_quantity(&mut self, qty: i64) -> i64 {
        let max = self.source.as_ref().map_or(i64::MAX, |s| s.quantity);
        self.quantity = qty.clamp(1, max.max(1));
        self.quantity
    }

    pub fn set_notes(&mut self, notes: &str) {
        let notes = notes.trim();
        self.notes = (!notes.is_empty()).then(|| notes.to_string());
    }

    /// Checks the requested quantity against a fresh branch-stock listing.
    pub fn revalidate(&self, latest: &[BranchStock]) -> FlowResult<()> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| ValidationError::required("source branch"))?;
        let available = latest
            .iter()
            .find(|s| s.branch_id == source.branch_id)
            .map_or(0, |s| s.quantity);
        if self.quantity > available {
            return Err(FlowError::StockChanged {
                branch: source.branch_name.clone(),
                available,
                requested: self.quantity,
            });
        }
        Ok(())
    }

    /// Validates the draft and builds the request body.
    pub fn build_request(&self) -> FlowResult<TransferCreateRequest> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| ValidationError::required("source branch"))?;
        validate_transfer_quantity(self.quantity, source.quantity)?;
        Ok(TransferCreateRequest {
            product_id: self.product_id,
            from_branch_id: source.branch_id,
            quantity: self.quantity,
            notes: self.notes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(id: i64, name: &str, quantity: i64) -> BranchStock {
        BranchStock {
            branch_id: id,
            branch_name: name.to_string(),
            quantity,
        }
    }

    fn listing() -> Vec<BranchStock> {
        vec![
            stock(1, "Andheri", 5),
            stock(2, "Bandra", 0),
            stock(3, "Colaba", 2),
        ]
    }

    #[test]
    fn test_own_and_empty_branches_are_excluded() {
        let mut d = TransferDraft::new(10, Some(" andheri ".to_string()));
        d.set_sources(listing());
        let ids: Vec<i64> = d.sources().iter().map(|s| s.branch_id).collect();
        assert_eq!(ids, vec![3]);
        assert!(matches!(
            d.select_source(1),
            Err(FlowError::SourceNotAvailable(1))
        ));
    }

    #[test]
    fn test_quantity_clamped_to_source() {
        let mut d = TransferDraft::new(10, Some("Bandra".to_string()));
        d.set_sources(listing());
        d.set_quantity(9);
        d.select_source(3).unwrap();
        assert_eq!(d.quantity(), 2);
        assert_eq!(d.set_quantity(7), 2);
        assert_eq!(d.set_quantity(0), 1);

        let req = d.build_request().unwrap();
        assert_eq!(req.from_branch_id, 3);
        assert_eq!(req.quantity, 1);
    }

    #[test]
    fn test_build_requires_source() {
        let d = TransferDraft::new(10, None);
        assert!(d.build_request().is_err());
    }

    #[test]
    fn test_revalidate_rejects_shrunk_source() {
        let mut d = TransferDraft::new(10, None);
        d.set_sources(listing());
        d.select_source(1).unwrap();
        d.set_quantity(4);

        assert!(d.revalidate(&listing()).is_ok());
        let shrunk = vec![stock(1, "Andheri", 3)];
        assert!(matches!(
            d.revalidate(&shrunk),
            Err(FlowError::StockChanged {
                available: 3,
                requested: 4,
                ..
            })
        ));
        assert!(d.revalidate(&[]).is_err());
    }

    #[test]
    fn test_refresh_drops_vanished_source() {
        let mut d = TransferDraft::new(10, None);
        d.set_sources(listing());
        d.select_source(3).unwrap();
        d.set_sources(vec![stock(1, "Andheri", 5), stock(3, "Colaba", 0)]);
        assert!(d.source().is_none());
    }
}
