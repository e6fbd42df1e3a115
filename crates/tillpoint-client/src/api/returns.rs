use tracing::info;

use tillpoint_core::requests::ReturnRequest;

use crate::api::SubmitReceipt;
use crate::error::ClientResult;
use crate::http::PosClient;

impl PosClient {
    pub async fn submit_return(&self, request: &ReturnRequest) -> ClientResult<SubmitReceipt> {
        let (request_id, body) = self.post_json("api/pos/bill/return/", request).await?;
        info!(
            %request_id,
            bill_id = request.bill_id,
            item_id = request.item_id,
            quantity = request.quantity,
            destination = %request.destination,
            "Return submitted"
        );
        Ok(SubmitReceipt::new(request_id, body))
    }
}
