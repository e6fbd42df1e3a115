//! Rack listing and stock allocation.

use tracing::{debug, info};

use tillpoint_core::{Slot, StockItemId};

use crate::error::{DeskError, DeskResult, ErrorCode};
use crate::state::AppState;
use crate::view;

/// `racks`
pub async fn racks(app: &AppState) -> DeskResult<String> {
    let racks = app.client.racks().await?;
    let text = view::racks(&racks);
    app.stock.set_racks(racks)?;
    Ok(text)
}

/// `stock`: current allocation rows, re-derived from the backend each time.
pub async fn stock(app: &AppState) -> DeskResult<String> {
    let ticket = app.sequencer.issue(Slot::Allocation);
    let items = app.client.stock_allocations().await?;
    if !app.sequencer.is_current(&ticket) {
        debug!("Dropping stale allocation response");
        return Ok("(superseded by a newer request)".to_string());
    }
    let text = view::stock(&items);
    app.stock.set_items(items)?;
    Ok(text)
}

/// `allocate <productId-recordId> <rack id>`
///
/// A rack id is checked against the cached list when one has been fetched.
pub async fn allocate(app: &AppState, item: &str, rack_id: i64) -> DeskResult<String> {
    let item: StockItemId = item.parse()?;
    let rack_name = if app.stock.has_racks()? {
        let rack = app.stock.rack(rack_id)?.ok_or_else(|| {
            DeskError::new(ErrorCode::NotFound, format!("No rack with id {rack_id}"))
        })?;
        rack.name
    } else {
        format!("rack {rack_id}")
    };

    let receipt = app.client.allocate(item, rack_id).await?;
    info!(item = %item, rack_id, "Allocation saved");
    let header = format!(
        "{item} allocated to {rack_name}. {}",
        receipt.message.unwrap_or_default()
    );
    // Allocation rows are never patched locally.
    Ok(format!("{header}\n{}", stock(app).await?))
}
