use tracing::info;

use tillpoint_core::requests::AllocateRequest;
use tillpoint_core::{Rack, StockItem, StockItemId};

use crate::api::SubmitReceipt;
use crate::error::ClientResult;
use crate::http::PosClient;
use crate::wire::{Envelope, RawRack, RawStockItem};

impl PosClient {
    pub async fn racks(&self) -> ClientResult<Vec<Rack>> {
        let body = self.get_json("api/pos/racks/", &[]).await?;
        Envelope::RACKS.decode::<RawRack, Rack>(body)
    }

    pub async fn stock_allocations(&self) -> ClientResult<Vec<StockItem>> {
        let body = self.get_json("api/pos/stock/allocations/", &[]).await?;
        Envelope::ALLOCATIONS.decode::<RawStockItem, StockItem>(body)
    }

    /// Puts a stock row on a rack.
    pub async fn allocate(&self, item: StockItemId, rack_id: i64) -> ClientResult<SubmitReceipt> {
        let request = AllocateRequest::new(item, rack_id);
        let (request_id, body) = self.post_json("api/pos/stock/allocate/", &request).await?;
        info!(%request_id, item = %item, rack_id, "Stock allocated");
        Ok(SubmitReceipt::new(request_id, body))
    }
}
