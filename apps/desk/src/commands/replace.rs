//! Replacement flow: warranty swaps and dissatisfaction exchanges.

use tracing::{debug, warn};

use tillpoint_core::validation::validate_search_query;
use tillpoint_core::{Discount, FlowError, ReplacementType, SettlementMethod, Slot};

use super::show;
use crate::error::DeskResult;
use crate::state::AppState;

/// `replace [warranty|dissatisfaction]`
///
/// Opens the replacement from the action chooser; with a type, also locks
/// the sub-type in.
pub fn begin(app: &AppState, replacement_type: Option<ReplacementType>) -> DeskResult<String> {
    app.desk.with_desk_mut(|desk| {
        if desk.replacement_draft().is_err() {
            desk.begin_replacement()?;
        }
        if let Some(t) = replacement_type {
            desk.replacement_draft()?.choose_type(t)?;
        }
        Ok::<_, FlowError>(())
    })?;
    show(app)
}

/// `serial <new serial>`
pub fn set_serial(app: &AppState, serial: &str) -> DeskResult<String> {
    app.desk
        .with_desk_mut(|desk| desk.replacement_draft()?.set_new_serial(serial))?;
    show(app)
}

/// `find <query>`: debounced product search for the new product.
pub async fn find(app: &AppState, query: &str) -> DeskResult<String> {
    let query = validate_search_query(query)?;
    app.desk.with_desk_mut(|desk| {
        match desk.replacement_draft()?.replacement_type() {
            Some(ReplacementType::Dissatisfaction) => Ok(()),
            _ => Err(FlowError::WrongReplacementType("dissatisfaction")),
        }
    })?;

    let ticket = app.sequencer.issue(Slot::ProductSearch);
    let client = &app.client;
    let Some(result) = app
        .product_search
        .run(|| client.search_products(&query))
        .await
    else {
        debug!(%query, "Product search superseded while typing");
        return Ok(super::bill::SUPERSEDED.to_string());
    };
    if !app.sequencer.is_current(&ticket) {
        return Ok(super::bill::SUPERSEDED.to_string());
    }
    let products = result?;

    app.desk
        .with_desk_mut(|desk| desk.replacement_draft()?.apply_candidates(products))?;
    show(app)
}

/// `pick <product id>`
pub fn pick(app: &AppState, product_id: i64) -> DeskResult<String> {
    app.desk
        .with_desk_mut(|desk| desk.replacement_draft()?.select_product(product_id))?;
    show(app)
}

/// `drop`: releases the locked product.
pub fn drop_product(app: &AppState) -> DeskResult<String> {
    app.desk
        .with_desk_mut(|desk| desk.replacement_draft()?.remove_product())?;
    show(app)
}

/// `discount <pct>% | fixed <amount> | none`
pub fn set_discount(app: &AppState, discount: Option<Discount>) -> DeskResult<String> {
    app.desk
        .with_desk_mut(|desk| desk.replacement_draft()?.set_discount(discount))?;
    show(app)
}

/// `settle cash | upi | split <cash> <upi>`
pub fn settle(app: &AppState, method: SettlementMethod) -> DeskResult<String> {
    app.desk
        .with_desk_mut(|desk| desk.replacement_draft()?.settle(method))?;
    show(app)
}

pub async fn submit(app: &AppState) -> DeskResult<String> {
    let request = app
        .desk
        .with_desk_mut(|desk| desk.replacement_draft()?.build_request())?;

    let receipt = match app.client.submit_replacement(&request).await {
        Ok(receipt) => receipt,
        Err(e) => {
            warn!(bill_id = request.bill_id, error = %e, "Replacement failed, draft kept");
            return Err(e.into());
        }
    };

    app.desk.with_desk_mut(|desk| {
        desk.complete_submission();
        Ok::<_, FlowError>(())
    })?;
    let money = match (&request.payment, &request.refund) {
        (Some(p), _) => format!(", collected {} by {}", p.amount, p.method),
        (_, Some(r)) => format!(", refunded {} by {}", r.amount, r.method),
        _ => String::new(),
    };
    Ok(format!(
        "Replacement recorded ({}){}. {}\n{}",
        request.replacement_type,
        money,
        receipt.message.unwrap_or_default(),
        show(app)?
    ))
}
