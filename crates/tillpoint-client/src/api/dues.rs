use tracing::info;

use tillpoint_core::requests::DueUpdateRequest;

use crate::api::SubmitReceipt;
use crate::error::ClientResult;
use crate::http::PosClient;

impl PosClient {
    pub async fn update_due(&self, request: &DueUpdateRequest) -> ClientResult<SubmitReceipt> {
        let (request_id, body) = self.post_json("api/pos/due/update/", request).await?;
        info!(
            %request_id,
            bill_id = request.bill_id,
            method = %request.payment_method,
            amount = %request.amount,
            "Due payment recorded"
        );
        Ok(SubmitReceipt::new(request_id, body))
    }
}
