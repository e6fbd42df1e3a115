use tracing::debug;

use tillpoint_core::validation::validate_search_query;
use tillpoint_core::Bill;

use crate::error::ClientResult;
use crate::http::PosClient;
use crate::wire::{Envelope, RawBill};

impl PosClient {
    /// Looks up bills by number, customer name or phone.
    ///
    /// Blank queries fail locally without a request. An empty result is an
    /// empty list; deciding that it means "not found" is up to the desk.
    pub async fn search_bills(&self, query: &str) -> ClientResult<Vec<Bill>> {
        let query = validate_search_query(query)?;
        let body = self
            .get_json("api/pos/bills/search/", &[("q", query.as_str())])
            .await?;
        let bills = Envelope::BILLS.decode::<RawBill, Bill>(body)?;
        debug!(%query, count = bills.len(), "Bill search decoded");
        Ok(bills)
    }
}
