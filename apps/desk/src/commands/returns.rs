//! Return flow: refund method and submission.

use tracing::warn;

use tillpoint_core::{FlowError, RefundMethod};

use super::show;
use crate::error::DeskResult;
use crate::state::AppState;

/// `return`: opens a return for the selected item.
pub fn begin(app: &AppState) -> DeskResult<String> {
    app.desk.with_desk_mut(|desk| desk.begin_return())?;
    show(app)
}

/// `refund cash|online`
pub fn set_refund_method(app: &AppState, method: RefundMethod) -> DeskResult<String> {
    app.desk
        .with_desk_mut(|desk| desk.return_draft()?.set_refund_method(method))?;
    show(app)
}

/// Sends the return. On failure the draft stays as it was.
pub async fn submit(app: &AppState) -> DeskResult<String> {
    let request = app
        .desk
        .with_desk_mut(|desk| desk.return_draft()?.build_request())?;

    let receipt = match app.client.submit_return(&request).await {
        Ok(receipt) => receipt,
        Err(e) => {
            warn!(bill_id = request.bill_id, error = %e, "Return failed, draft kept");
            return Err(e.into());
        }
    };

    app.desk.with_desk_mut(|desk| {
        desk.complete_submission();
        Ok::<_, FlowError>(())
    })?;
    let refund = match request.refund_method {
        Some(method) => format!("refund {} by {method}", request.refund_amount),
        None => "no refund (pay-later bill)".to_string(),
    };
    Ok(format!(
        "Return recorded: {} unit(s), {}, stock to {}. {}\n{}",
        request.quantity,
        refund,
        request.destination,
        receipt.message.unwrap_or_default(),
        show(app)?
    ))
}
