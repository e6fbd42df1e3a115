//! Due-payment draft for pay-later bills.
//!
//! Single tenders are clamped into `[0, due]` as they are typed. Split parts
//! are clamped one by one and their sum is checked at submission. A zero
//! total is never sent.

use crate::error::{FlowError, FlowResult, ValidationError};
use crate::money::Money;
use crate::requests::DueUpdateRequest;
use crate::settlement::split_total;
use crate::types::{Bill, PaymentMethod};
use crate::validation::validate_payment_amount;

/// Tender collected against the due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueTender {
    Cash(Money),
    Upi(Money),
    Split { cash: Money, upi: Money },
}

impl DueTender {
    pub fn method(&self) -> PaymentMethod {
        match self {
            DueTender::Cash(_) => PaymentMethod::Cash,
            DueTender::Upi(_) => PaymentMethod::Upi,
            DueTender::Split { .. } => PaymentMethod::Split,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueDraft {
    bill_id: i64,
    bill_number: String,
    due: Money,
    tender: Option<DueTender>,
}

impl DueDraft {
    /// Opens a collection. Only bills without payment records qualify.
    pub fn new(bill: &Bill) -> FlowResult<Self> {
        if !bill.is_pay_later {
            return Err(FlowError::NotPayLater {
                bill_number: bill.bill_number.clone(),
            });
        }
        Ok(DueDraft {
            bill_id: bill.id,
            bill_number: bill.bill_number.clone(),
            due: bill.due_amount(),
            tender: None,
        })
    }

    pub fn bill_number(&self) -> &str {
        &self.bill_number
    }

    pub fn due(&self) -> Money {
        self.due
    }

    pub fn tender(&self) -> Option<DueTender> {
        self.tender
    }

    fn clamp(&self, amount: Money) -> Money {
        amount.clamp(Money::zero(), self.due)
    }

    /// Cash only. Returns the amount actually recorded.
    pub fn set_cash(&mut self, amount: Money) -> Money {
        let amount = self.clamp(amount);
        self.tender = Some(DueTender::Cash(amount));
        amount
    }

    /// UPI only. Returns the amount actually recorded.
    pub fn set_upi(&mut self, amount: Money) -> Money {
        let amount = self.clamp(amount);
        self.tender = Some(DueTender::Upi(amount));
        amount
    }

    pub fn set_split(&mut self, cash: Money, upi: Money) {
        self.tender = Some(DueTender::Split {
            cash: self.clamp(cash),
            upi: self.clamp(upi),
        });
    }

    /// Validates the tender and builds the request body.
    pub fn build_request(&self) -> FlowResult<DueUpdateRequest> {
        let tender = self
            .tender
            .ok_or_else(|| ValidationError::required("payment method"))?;

        let (amount, cash_amount, upi_amount) = match tender {
            DueTender::Cash(cash) => (cash, Some(cash), None),
            DueTender::Upi(upi) => (upi, None, Some(upi)),
            DueTender::Split { cash, upi } => {
                let total = split_total(cash, upi)?;
                if total > self.due {
                    return Err(ValidationError::AmountOutOfRange {
                        field: "cash + UPI".to_string(),
                        min: Money::zero(),
                        max: self.due,
                    }
                    .into());
                }
                (total, Some(cash), Some(upi))
            }
        };

        validate_payment_amount(amount)?;

        Ok(DueUpdateRequest {
            bill_id: self.bill_id,
            payment_method: tender.method(),
            amount,
            cash_amount,
            upi_amount,
        })
    }
}
