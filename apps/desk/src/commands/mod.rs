//! # Commands
//!
//! One async function per console verb. Each locks state only to read or
//! apply, sends requests with no lock held, and returns the text to print.
//!
//! ## Bill Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  search ──► bill <id> ──► item <id> ──┬─► return ──► qty/refund/dest ─┐ │
//! │     ▲                                 │                               │ │
//! │     │                                 └─► replace ──► warranty ───────┤ │
//! │     │                                        │         serial/dest    │ │
//! │     │                                        └─► dissatisfaction ─────┤ │
//! │     │                  due ──► due cash|upi|split ──┐  find/pick/     │ │
//! │     │                                               │  discount/settle│ │
//! │     │                                               ▼                 ▼ │
//! │     └──────────────── success ◄──────────────── submit ◄──────────────┘ │
//! │                                                                         │
//! │  back: one step up, draft discarded     cancel: straight to search      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod bill;
pub mod due;
pub mod replace;
pub mod returns;
pub mod stock;
pub mod transfer;

use tillpoint_core::{DeskStep, FlowError, StockDestination};

use crate::error::DeskResult;
use crate::state::AppState;
use crate::view;

/// Renders the current step.
pub fn show(app: &AppState) -> DeskResult<String> {
    app.desk.with_desk(|desk| view::step(desk.step()))
}

fn wrong_step(operation: &'static str, step: &DeskStep) -> FlowError {
    FlowError::WrongStep {
        operation,
        step: step.name(),
    }
}

/// `qty <n>` for whichever draft is open. Out-of-range values are clamped.
pub fn set_quantity(app: &AppState, qty: i64) -> DeskResult<String> {
    app.desk.with_desk_mut(|desk| {
        match desk.step() {
            DeskStep::Return { .. } => {
                desk.return_draft()?.set_quantity(qty);
            }
            DeskStep::Replace { .. } => {
                desk.replacement_draft()?.set_quantity(qty);
            }
            other => return Err(wrong_step("set a quantity", other)),
        }
        Ok(())
    })?;
    show(app)
}

/// `dest stock|vendor`
pub fn set_destination(app: &AppState, destination: StockDestination) -> DeskResult<String> {
    app.desk.with_desk_mut(|desk| {
        match desk.step() {
            DeskStep::Return { .. } => desk.return_draft()?.set_destination(destination),
            DeskStep::Replace { .. } => desk.replacement_draft()?.set_destination(destination),
            other => return Err(wrong_step("choose where stock goes", other)),
        }
        Ok(())
    })?;
    show(app)
}

/// `submit` for whichever draft is open.
pub async fn submit(app: &AppState) -> DeskResult<String> {
    enum Open {
        Return,
        Replace,
        Due,
    }
    let open = app.desk.with_desk_mut(|desk| match desk.step() {
        DeskStep::Return { .. } => Ok(Open::Return),
        DeskStep::Replace { .. } => Ok(Open::Replace),
        DeskStep::CollectDue { .. } => Ok(Open::Due),
        other => Err(wrong_step("submit", other)),
    })?;
    match open {
        Open::Return => returns::submit(app).await,
        Open::Replace => replace::submit(app).await,
        Open::Due => due::submit(app).await,
    }
}

/// `back`: one level up. Nothing already fetched is touched, but pending
/// searches are dropped.
pub fn back(app: &AppState) -> DeskResult<String> {
    app.drop_bill_lookups();
    app.desk.with_desk_mut(|desk| {
        desk.back();
        Ok::<_, FlowError>(())
    })?;
    show(app)
}

/// `cancel`: drop everything and return to search.
pub fn cancel(app: &AppState) -> DeskResult<String> {
    app.drop_bill_lookups();
    app.desk.with_desk_mut(|desk| {
        desk.reset();
        Ok::<_, FlowError>(())
    })?;
    show(app)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;
    use tillpoint_client::{ClientConfig, Debouncer, PosClient, SessionContext};
    use tillpoint_core::{Bill, BillItem, Customer, Money};

    use crate::error::ErrorCode;

    /// State with a client that is never reached: these tests stay offline.
    pub(crate) fn offline_app() -> AppState {
        let client = PosClient::new(
            &ClientConfig::with_base_url("http://127.0.0.1:9/"),
            Arc::new(SessionContext::in_memory()),
        )
        .unwrap();
        AppState::new(client, Debouncer::new(std::time::Duration::from_millis(350)))
    }

    pub(crate) fn sample_bill() -> Bill {
        let item = |id: i64, quantity: i64, returned: i64| BillItem {
            id,
            product_id: 10 + id,
            name: format!("Item {id}"),
            model: None,
            quantity,
            unit_price: Money::from_rupees(250),
            returned_qty: returned,
            is_returned: returned == quantity,
            serial_number: None,
            final_amount: Money::from_rupees(250 * quantity),
            salesperson: None,
        };
        Bill {
            id: 7,
            bill_number: "INV-7".into(),
            date: None,
            customer: Customer {
                name: "Asha".into(),
                phone: None,
                due_balance: Money::zero(),
            },
            items: vec![item(1, 3, 1), item(2, 1, 1)],
            payments: vec![tillpoint_core::BillPayment {
                method: "cash".into(),
                amount: Money::from_rupees(1000),
            }],
            final_amount: Money::from_rupees(1000),
            is_pay_later: false,
        }
    }

    pub(crate) fn at_item(app: &AppState) {
        app.desk
            .with_desk_mut(|d| {
                d.apply_search_results("INV-7", vec![sample_bill()])?;
                d.select_item(1)
            })
            .unwrap();
    }

    #[test]
    fn test_quantity_is_clamped_in_return() {
        let app = offline_app();
        at_item(&app);
        app.desk.with_desk_mut(|d| d.begin_return()).unwrap();

        set_quantity(&app, 9).unwrap();
        let qty = app
            .desk
            .with_desk_mut(|d| d.return_draft().map(|r| r.quantity()))
            .unwrap();
        assert_eq!(qty, 2);
    }

    #[test]
    fn test_quantity_outside_a_draft_is_rejected() {
        let app = offline_app();
        let err = set_quantity(&app, 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::Workflow);
    }

    #[test]
    fn test_back_keeps_fetched_state() {
        let app = offline_app();
        at_item(&app);
        let before = app.desk.snapshot().unwrap();

        app.desk.with_desk_mut(|d| d.begin_return()).unwrap();
        set_quantity(&app, 2).unwrap();
        back(&app).unwrap();

        assert_eq!(app.desk.snapshot().unwrap(), before);
    }

    #[tokio::test]
    async fn test_submit_without_destination_never_sends() {
        let app = offline_app();
        at_item(&app);
        app.desk.with_desk_mut(|d| d.begin_return()).unwrap();
        returns::set_refund_method(&app, tillpoint_core::RefundMethod::Cash).unwrap();

        let err = submit(&app).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("stock disposition"));
    }

    #[test]
    fn test_cancel_returns_to_search() {
        let app = offline_app();
        at_item(&app);
        cancel(&app).unwrap();
        assert_eq!(app.desk.snapshot().unwrap().step(), &DeskStep::Search);
    }
}
