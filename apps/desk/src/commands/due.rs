//! Due collection on pay-later bills.

use tracing::{info, warn};

use tillpoint_core::flow::DueTender;
use tillpoint_core::{DeskStep, FlowError};

use super::show;
use crate::error::DeskResult;
use crate::state::AppState;

/// `due`: opens collection for the bill on screen.
pub fn begin(app: &AppState) -> DeskResult<String> {
    app.desk.with_desk_mut(|desk| desk.begin_due_collection())?;
    show(app)
}

/// `due cash|upi <amount>` or `due split <cash> <upi>`. Amounts are clamped
/// into the due.
pub fn set_tender(app: &AppState, tender: DueTender) -> DeskResult<String> {
    app.desk.with_desk_mut(|desk| {
        let draft = desk.due_draft()?;
        match tender {
            DueTender::Cash(amount) => {
                draft.set_cash(amount);
            }
            DueTender::Upi(amount) => {
                draft.set_upi(amount);
            }
            DueTender::Split { cash, upi } => draft.set_split(cash, upi),
        }
        Ok::<_, FlowError>(())
    })?;
    show(app)
}

/// Records the payment, then re-searches the bill so the due shown is the
/// backend's.
pub async fn submit(app: &AppState) -> DeskResult<String> {
    let (request, bill_number) = app.desk.with_desk_mut(|desk| {
        let bill_number = match desk.step() {
            DeskStep::CollectDue { bill, .. } => bill.bill_number.clone(),
            other => {
                return Err(FlowError::WrongStep {
                    operation: "collect a due payment",
                    step: other.name(),
                })
            }
        };
        let request = desk.due_draft()?.build_request()?;
        Ok((request, bill_number))
    })?;

    let receipt = app.client.update_due(&request).await?;
    info!(bill_id = request.bill_id, "Due collected, refreshing bill");
    let header = format!(
        "Collected {} by {} on {}. {}",
        request.amount,
        request.payment_method,
        bill_number,
        receipt.message.unwrap_or_default()
    );

    let refreshed = match app.client.search_bills(&bill_number).await {
        Ok(bills) => app
            .desk
            .with_desk_mut(|desk| desk.apply_refreshed_bill(bills, request.bill_id)),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = refreshed {
        warn!(error = %e, "Could not refresh bill after due payment");
        app.desk.with_desk_mut(|desk| {
            desk.reset();
            Ok::<_, FlowError>(())
        })?;
        return Ok(format!("{header}\nSearch the bill again to see its balance."));
    }
    Ok(format!("{header}\n{}", show(app)?))
}
