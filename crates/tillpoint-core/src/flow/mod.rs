//! # Desk Workflow
//!
//! The return/replace desk as an explicit state machine. Each step carries
//! exactly the data it needs, so an operation that does not belong to the
//! current step cannot find anything to act on.
//!
//! ## Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Search ──(1 bill)──────────────────► SelectItem ──► ChooseAction      │
//! │     │                                     ▲  │          │     │       │
//! │     └──(n bills)──► SelectBill ──────────┘  │       return  replace   │
//! │                                               │          │     │       │
//! │                                   (pay-later) ▼          ▼     ▼       │
//! │                                          CollectDue   Return  Replace  │
//! │                                                                         │
//! │   submit ok ──► Search            back ──► previous step                │
//! │   submit err ─► same step         cancel ─► Search                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transfers are not part of the bill desk; see [`transfer::TransferDraft`].

pub mod due;
pub mod replacement;
pub mod return_flow;
pub mod transfer;

pub use due::{DueDraft, DueTender};
pub use replacement::{ReplacementDraft, ReplacementKind};
pub use return_flow::{ReturnDraft, ReturnStage};
pub use transfer::TransferDraft;

use crate::error::{FlowError, FlowResult};
use crate::types::{Bill, BillItem};

// =============================================================================
// Step
// =============================================================================

/// Where the desk currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeskStep {
    #[default]
    Search,
    SelectBill {
        bills: Vec<Bill>,
    },
    SelectItem {
        bill: Bill,
    },
    ChooseAction {
        bill: Bill,
        item: BillItem,
    },
    Return {
        bill: Bill,
        draft: ReturnDraft,
    },
    Replace {
        bill: Bill,
        draft: ReplacementDraft,
    },
    CollectDue {
        bill: Bill,
        draft: DueDraft,
    },
}

impl DeskStep {
    /// Human phrase for error messages ("Cannot X while <name>").
    pub fn name(&self) -> &'static str {
        match self {
            DeskStep::Search => "searching for a bill",
            DeskStep::SelectBill { .. } => "choosing a bill",
            DeskStep::SelectItem { .. } => "choosing an item",
            DeskStep::ChooseAction { .. } => "choosing return or replace",
            DeskStep::Return { .. } => "processing a return",
            DeskStep::Replace { .. } => "processing a replacement",
            DeskStep::CollectDue { .. } => "collecting a due payment",
        }
    }

    /// The bill the step is working on, if any.
    pub fn bill(&self) -> Option<&Bill> {
        match self {
            DeskStep::Search | DeskStep::SelectBill { .. } => None,
            DeskStep::SelectItem { bill }
            | DeskStep::ChooseAction { bill, .. }
            | DeskStep::Return { bill, .. }
            | DeskStep::Replace { bill, .. }
            | DeskStep::CollectDue { bill, .. } => Some(bill),
        }
    }
}

// =============================================================================
// Desk
// =============================================================================

/// Bill desk state: the current step plus the last search results so that
/// `back` can return to the bill list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Desk {
    step: DeskStep,
    results: Vec<Bill>,
    last_query: Option<String>,
}

impl Desk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> &DeskStep {
        &self.step
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    fn wrong_step(&self, operation: &'static str) -> FlowError {
        FlowError::WrongStep {
            operation,
            step: self.step.name(),
        }
    }

    // =========================================================================
    // Search & Selection
    // =========================================================================

    /// Applies decoded search results.
    ///
    /// Zero bills is an error and leaves the desk untouched. One bill skips
    /// the bill list.
    pub fn apply_search_results(&mut self, query: &str, bills: Vec<Bill>) -> FlowResult<()> {
        if bills.is_empty() {
            return Err(FlowError::NoBillsFound {
                query: query.to_string(),
            });
        }
        self.last_query = Some(query.to_string());
        self.step = if bills.len() == 1 {
            let bill = bills[0].clone();
            self.results = bills;
            DeskStep::SelectItem { bill }
        } else {
            self.results = bills.clone();
            DeskStep::SelectBill { bills }
        };
        Ok(())
    }

    /// Re-applies a refreshed copy of the bill being worked on (after a due
    /// payment) and lands on item selection.
    pub fn apply_refreshed_bill(&mut self, bills: Vec<Bill>, bill_id: i64) -> FlowResult<()> {
        let bill = bills
            .iter()
            .find(|b| b.id == bill_id)
            .cloned()
            .ok_or(FlowError::BillNotListed(bill_id))?;
        self.results = bills;
        self.step = DeskStep::SelectItem { bill };
        Ok(())
    }

    pub fn choose_bill(&mut self, bill_id: i64) -> FlowResult<()> {
        let DeskStep::SelectBill { bills } = &self.step else {
            return Err(self.wrong_step("choose a bill"));
        };
        let bill = bills
            .iter()
            .find(|b| b.id == bill_id)
            .cloned()
            .ok_or(FlowError::BillNotListed(bill_id))?;
        self.step = DeskStep::SelectItem { bill };
        Ok(())
    }

    pub fn select_item(&mut self, item_id: i64) -> FlowResult<()> {
        let DeskStep::SelectItem { bill } = &self.step else {
            return Err(self.wrong_step("select an item"));
        };
        let item = bill
            .item(item_id)
            .ok_or(FlowError::ItemNotOnBill(item_id))?;
        if !item.is_selectable() {
            return Err(FlowError::ItemFullyReturned {
                name: item.name.clone(),
            });
        }
        self.step = DeskStep::ChooseAction {
            item: item.clone(),
            bill: bill.clone(),
        };
        Ok(())
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub fn begin_return(&mut self) -> FlowResult<()> {
        let DeskStep::ChooseAction { bill, item } = &self.step else {
            return Err(self.wrong_step("start a return"));
        };
        self.step = DeskStep::Return {
            draft: ReturnDraft::new(bill, item),
            bill: bill.clone(),
        };
        Ok(())
    }

    pub fn begin_replacement(&mut self) -> FlowResult<()> {
        let DeskStep::ChooseAction { bill, item } = &self.step else {
            return Err(self.wrong_step("start a replacement"));
        };
        self.step = DeskStep::Replace {
            draft: ReplacementDraft::new(bill, item),
            bill: bill.clone(),
        };
        Ok(())
    }

    /// Opens due collection for the bill on screen.
    pub fn begin_due_collection(&mut self) -> FlowResult<()> {
        let bill = match &self.step {
            DeskStep::SelectItem { bill } | DeskStep::ChooseAction { bill, .. } => bill,
            _ => return Err(self.wrong_step("collect a due payment")),
        };
        let draft = DueDraft::new(bill)?;
        self.step = DeskStep::CollectDue {
            bill: bill.clone(),
            draft,
        };
        Ok(())
    }

    pub fn return_draft(&mut self) -> FlowResult<&mut ReturnDraft> {
        let step = self.step.name();
        match &mut self.step {
            DeskStep::Return { draft, .. } => Ok(draft),
            _ => Err(FlowError::WrongStep {
                operation: "edit a return",
                step,
            }),
        }
    }

    pub fn replacement_draft(&mut self) -> FlowResult<&mut ReplacementDraft> {
        let step = self.step.name();
        match &mut self.step {
            DeskStep::Replace { draft, .. } => Ok(draft),
            _ => Err(FlowError::WrongStep {
                operation: "edit a replacement",
                step,
            }),
        }
    }

    pub fn due_draft(&mut self) -> FlowResult<&mut DueDraft> {
        let step = self.step.name();
        match &mut self.step {
            DeskStep::CollectDue { draft, .. } => Ok(draft),
            _ => Err(FlowError::WrongStep {
                operation: "edit a due payment",
                step,
            }),
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Steps back one level, discarding any draft.
    pub fn back(&mut self) {
        let step = std::mem::take(&mut self.step);
        self.step = match step {
            DeskStep::Search => DeskStep::Search,
            DeskStep::SelectBill { .. } => DeskStep::Search,
            DeskStep::SelectItem { .. } if self.results.len() > 1 => DeskStep::SelectBill {
                bills: self.results.clone(),
            },
            DeskStep::SelectItem { .. } => DeskStep::Search,
            DeskStep::ChooseAction { bill, .. } | DeskStep::CollectDue { bill, .. } => {
                DeskStep::SelectItem { bill }
            }
            DeskStep::Return { bill, draft } => DeskStep::ChooseAction {
                bill,
                item: draft.item().clone(),
            },
            DeskStep::Replace { bill, draft } => DeskStep::ChooseAction {
                bill,
                item: draft.item().clone(),
            },
        };
    }

    /// Drops everything and returns to search.
    pub fn reset(&mut self) {
        *self = Desk::default();
    }

    /// Called after a return or replacement was accepted by the backend.
    pub fn complete_submission(&mut self) {
        self.reset();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::{bill, item};

    fn two_bills() -> Vec<Bill> {
        let first = bill(vec![item(1, 2, 0, 100), item(2, 1, 1, 300)], true);
        let mut second = bill(vec![item(3, 1, 0, 50)], false);
        second.id = 2;
        second.bill_number = "INV-1043".to_string();
        vec![first, second]
    }

    #[test]
    fn test_single_result_skips_bill_list() {
        let mut desk = Desk::new();
        let bills = vec![two_bills().remove(0)];
        desk.apply_search_results("INV-1042", bills).unwrap();
        assert!(matches!(desk.step(), DeskStep::SelectItem { .. }));
    }

    #[test]
    fn test_no_results_keep_step() {
        let mut desk = Desk::new();
        desk.apply_search_results("x", two_bills()).unwrap();
        let before = desk.clone();
        assert!(matches!(
            desk.apply_search_results("nothing", Vec::new()),
            Err(FlowError::NoBillsFound { .. })
        ));
        assert_eq!(desk, before);
    }

    #[test]
    fn test_fully_returned_item_is_rejected() {
        let mut desk = Desk::new();
        desk.apply_search_results("x", two_bills()).unwrap();
        desk.choose_bill(1).unwrap();
        assert!(matches!(
            desk.select_item(2),
            Err(FlowError::ItemFullyReturned { .. })
        ));
        assert!(matches!(desk.select_item(99), Err(FlowError::ItemNotOnBill(99))));
        desk.select_item(1).unwrap();
        assert!(matches!(desk.step(), DeskStep::ChooseAction { .. }));
    }

    #[test]
    fn test_wrong_step_is_reported() {
        let mut desk = Desk::new();
        let err = desk.begin_return().unwrap_err();
        assert_eq!(err.to_string(), "Cannot start a return while searching for a bill");
        assert!(desk.return_draft().is_err());
    }

    #[test]
    fn test_cancelled_draft_leaves_fetched_state_identical() {
        let mut desk = Desk::new();
        desk.apply_search_results("x", two_bills()).unwrap();
        desk.choose_bill(1).unwrap();
        desk.select_item(1).unwrap();
        let before = desk.step().clone();

        desk.begin_replacement().unwrap();
        desk.replacement_draft().unwrap().set_quantity(2);
        desk.back();

        assert_eq!(desk.step(), &before);
    }

    #[test]
    fn test_back_walks_to_bill_list_then_search() {
        let mut desk = Desk::new();
        desk.apply_search_results("x", two_bills()).unwrap();
        desk.choose_bill(2).unwrap();
        desk.back();
        assert!(matches!(desk.step(), DeskStep::SelectBill { bills } if bills.len() == 2));
        desk.back();
        assert_eq!(desk.step(), &DeskStep::Search);
    }

    #[test]
    fn test_due_collection_only_for_pay_later() {
        let mut desk = Desk::new();
        desk.apply_search_results("x", two_bills()).unwrap();
        desk.choose_bill(1).unwrap();
        assert!(matches!(
            desk.begin_due_collection(),
            Err(FlowError::NotPayLater { .. })
        ));

        desk.back();
        desk.choose_bill(2).unwrap();
        desk.begin_due_collection().unwrap();
        assert!(desk.due_draft().is_ok());
    }

    #[test]
    fn test_complete_submission_resets() {
        let mut desk = Desk::new();
        desk.apply_search_results("x", two_bills()).unwrap();
        desk.choose_bill(1).unwrap();
        desk.select_item(1).unwrap();
        desk.begin_return().unwrap();
        desk.complete_submission();
        assert_eq!(desk, Desk::new());
    }
}
