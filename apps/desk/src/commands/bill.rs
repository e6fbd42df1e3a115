//! Bill search and selection.

use tracing::debug;

use tillpoint_core::Slot;

use super::show;
use crate::error::DeskResult;
use crate::state::AppState;

pub(crate) const SUPERSEDED: &str = "(superseded by a newer search)";

/// `search <query>`
///
/// Zero results leave the desk where it was. One result goes straight to
/// the item list.
pub async fn search(app: &AppState, query: &str) -> DeskResult<String> {
    let ticket = app.sequencer.issue(Slot::BillSearch);
    let result = app.client.search_bills(query).await;
    if !app.sequencer.is_current(&ticket) {
        debug!(query, "Dropping stale bill search response");
        return Ok(SUPERSEDED.to_string());
    }
    let bills = result?;
    let query = query.trim();
    app.desk
        .with_desk_mut(|desk| desk.apply_search_results(query, bills))?;
    show(app)
}

/// `bill <id>`
pub fn choose(app: &AppState, bill_id: i64) -> DeskResult<String> {
    app.desk.with_desk_mut(|desk| desk.choose_bill(bill_id))?;
    show(app)
}

/// `item <id>`
pub fn select_item(app: &AppState, item_id: i64) -> DeskResult<String> {
    app.desk.with_desk_mut(|desk| desk.select_item(item_id))?;
    show(app)
}
