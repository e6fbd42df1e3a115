//! # Inter-Branch Transfers
//!
//! Requesting stock from another branch, and answering requests addressed
//! to this one.
//!
//! ```text
//! transfer <pid> ──► branch-stock ──► from <branch> [qty] ──► transfer send
//!                                                                  │
//!                                            branch-stock re-fetch ┤
//!                                              revalidate ─────────┤
//!                                                                  ▼
//!                                                       POST transfers/create
//!
//! received ──► accept <id> | reject <id>   (pending only)
//! ```

use tracing::{debug, info, warn};

use tillpoint_core::flow::TransferDraft;
use tillpoint_core::{FlowError, Slot, TransferAction};

use crate::error::{DeskError, DeskResult, ErrorCode};
use crate::state::AppState;
use crate::view;

const STALE: &str = "(superseded by a newer request)";

fn no_draft() -> DeskError {
    DeskError::usage("No transfer open. Start one with `transfer <product id>`.")
}

fn show_draft(app: &AppState) -> DeskResult<String> {
    app.transfers
        .draft()?
        .map(|d| view::transfer_draft(&d))
        .ok_or_else(no_draft)
}

/// `transfer <product id>`: opens a draft and lists branches holding stock.
pub async fn start(app: &AppState, product_id: i64) -> DeskResult<String> {
    let own_branch = app.client.session().branch().await;
    let ticket = app.sequencer.issue(Slot::BranchStock);
    let stocks = app.client.branch_stock(product_id).await?;
    if !app.sequencer.is_current(&ticket) {
        debug!(product_id, "Dropping stale branch stock response");
        return Ok(STALE.to_string());
    }

    let mut draft = TransferDraft::new(product_id, own_branch);
    draft.set_sources(stocks);
    app.transfers.set_draft(Some(draft))?;
    show_draft(app)
}

/// `sources`: re-fetches availability for the open draft.
pub async fn refresh_sources(app: &AppState) -> DeskResult<String> {
    let product_id = app.transfers.draft()?.ok_or_else(no_draft)?.product_id();
    let ticket = app.sequencer.issue(Slot::BranchStock);
    let stocks = app.client.branch_stock(product_id).await?;
    if !app.sequencer.is_current(&ticket) {
        return Ok(STALE.to_string());
    }
    app.transfers.with_draft(|draft| {
        draft.set_sources(stocks);
        Ok(())
    })?;
    show_draft(app)
}

/// `from <branch id> [qty]`
pub fn choose_source(app: &AppState, branch_id: i64, qty: Option<i64>) -> DeskResult<String> {
    app.transfers
        .with_draft(|draft| {
            draft.select_source(branch_id)?;
            if let Some(qty) = qty {
                draft.set_quantity(qty);
            }
            Ok(())
        })?
        .ok_or_else(no_draft)?;
    show_draft(app)
}

/// `transfer qty <n>`, clamped to what the source holds.
pub fn set_quantity(app: &AppState, qty: i64) -> DeskResult<String> {
    app.transfers
        .with_draft(|draft| Ok(draft.set_quantity(qty)))?
        .ok_or_else(no_draft)?;
    show_draft(app)
}

/// `transfer note <text>`
pub fn set_notes(app: &AppState, notes: &str) -> DeskResult<String> {
    app.transfers
        .with_draft(|draft| {
            draft.set_notes(notes);
            Ok(())
        })?
        .ok_or_else(no_draft)?;
    show_draft(app)
}

/// `transfer send`
///
/// Availability is fetched again right before sending. If the source now
/// holds less than requested the draft is refreshed and nothing is sent.
pub async fn send(app: &AppState) -> DeskResult<String> {
    let draft = app.transfers.draft()?.ok_or_else(no_draft)?;
    let request = draft.build_request()?;

    let latest = app.client.branch_stock(draft.product_id()).await?;
    if let Err(e) = draft.revalidate(&latest) {
        warn!(product_id = draft.product_id(), error = %e, "Source stock changed before send");
        app.transfers.with_draft(|d| {
            d.set_sources(latest);
            Ok(())
        })?;
        return Err(e.into());
    }

    let receipt = app.client.create_transfer(&request).await?;
    info!(product_id = request.product_id, from = request.from_branch_id, "Transfer requested");
    app.transfers.set_draft(None)?;

    let header = format!(
        "Transfer requested: {} unit(s) of product {} from branch {}. {}",
        request.quantity,
        request.product_id,
        request.from_branch_id,
        receipt.message.unwrap_or_default()
    );
    match app.client.sent_transfers().await {
        Ok(list) => {
            app.transfers.set_sent(list.clone())?;
            Ok(format!("{header}\n{}", view::transfers("Sent", &list)))
        }
        Err(e) => {
            warn!(error = %e, "Could not refresh sent transfers");
            Ok(header)
        }
    }
}

/// `transfer cancel`
pub fn discard(app: &AppState) -> DeskResult<String> {
    app.transfers.set_draft(None)?;
    Ok("Transfer discarded".to_string())
}

/// `sent`
pub async fn sent(app: &AppState) -> DeskResult<String> {
    let ticket = app.sequencer.issue(Slot::Transfers);
    let list = app.client.sent_transfers().await?;
    if !app.sequencer.is_current(&ticket) {
        return Ok(STALE.to_string());
    }
    app.transfers.set_sent(list.clone())?;
    Ok(view::transfers("Sent", &list))
}

/// `received`
pub async fn received(app: &AppState) -> DeskResult<String> {
    let ticket = app.sequencer.issue(Slot::Transfers);
    let list = app.client.received_transfers().await?;
    if !app.sequencer.is_current(&ticket) {
        return Ok(STALE.to_string());
    }
    app.transfers.set_received(list.clone())?;
    Ok(view::transfers("Received", &list))
}

/// `accept <id>` / `reject <id>`
///
/// Only pending requests addressed to this branch can be answered. The list
/// is fetched first if it has not been seen yet.
pub async fn respond(app: &AppState, id: i64, action: TransferAction) -> DeskResult<String> {
    let known = match app.transfers.received(id)? {
        Some(t) => Some(t),
        None => {
            let list = app.client.received_transfers().await?;
            app.transfers.set_received(list)?;
            app.transfers.received(id)?
        }
    };
    let transfer = known.ok_or_else(|| {
        DeskError::new(ErrorCode::NotFound, format!("No received transfer with id {id}"))
    })?;
    if !transfer.is_actionable() {
        return Err(FlowError::TransferNotPending {
            id,
            status: transfer.status.to_string(),
        }
        .into());
    }

    let receipt = app.client.update_transfer(id, action).await?;
    info!(transfer_id = id, %action, "Transfer answered");
    let header = format!(
        "Transfer {id} {}ed. {}",
        action,
        receipt.message.unwrap_or_default()
    );

    // Status is the backend's to set; show what it now says.
    match app.client.received_transfers().await {
        Ok(list) => {
            app.transfers.set_received(list.clone())?;
            Ok(format!("{header}\n{}", view::transfers("Received", &list)))
        }
        Err(e) => {
            warn!(error = %e, "Could not refresh received transfers");
            Ok(header)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::offline_app;
    use tillpoint_core::{BranchStock, TransferRequest, TransferStatus};

    fn stock(id: i64, name: &str, quantity: i64) -> BranchStock {
        BranchStock {
            branch_id: id,
            branch_name: name.to_string(),
            quantity,
        }
    }

    fn open_draft(app: &AppState) {
        let mut draft = TransferDraft::new(42, Some("Andheri".into()));
        draft.set_sources(vec![stock(1, "andheri", 9), stock(2, "Bandra", 4), stock(3, "Thane", 0)]);
        app.transfers.set_draft(Some(draft)).unwrap();
    }

    #[test]
    fn test_edits_need_an_open_draft() {
        let app = offline_app();
        assert_eq!(set_quantity(&app, 2).unwrap_err().code, ErrorCode::Usage);
        assert_eq!(choose_source(&app, 2, None).unwrap_err().code, ErrorCode::Usage);
    }

    #[test]
    fn test_own_and_empty_branches_hidden() {
        let app = offline_app();
        open_draft(&app);
        let text = show_draft(&app).unwrap();
        assert!(text.contains("Bandra"));
        assert!(!text.contains("andheri"));
        assert!(!text.contains("Thane"));

        let err = choose_source(&app, 1, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::Workflow);
    }

    #[test]
    fn test_quantity_clamped_to_source() {
        let app = offline_app();
        open_draft(&app);
        choose_source(&app, 2, Some(10)).unwrap();
        let draft = app.transfers.draft().unwrap().unwrap();
        assert_eq!(draft.quantity(), 4);
        assert_eq!(draft.source().map(|s| s.branch_id), Some(2));
    }

    #[tokio::test]
    async fn test_send_without_source_never_sends() {
        let app = offline_app();
        open_draft(&app);
        let err = send(&app).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("source branch"));
    }

    #[tokio::test]
    async fn test_completed_transfer_cannot_be_answered() {
        let app = offline_app();
        app.transfers
            .set_received(vec![TransferRequest {
                id: 5,
                product_id: 42,
                product_name: "Kettle".into(),
                from_branch: "Andheri".into(),
                to_branch: "Bandra".into(),
                quantity: 2,
                status: TransferStatus::Completed,
                notes: None,
                created_at: None,
            }])
            .unwrap();

        let err = respond(&app, 5, TransferAction::Accept).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Workflow);
        assert!(err.message.contains("completed"));
    }

    #[test]
    fn test_discard_clears_draft() {
        let app = offline_app();
        open_draft(&app);
        discard(&app).unwrap();
        assert!(app.transfers.draft().unwrap().is_none());
    }
}
