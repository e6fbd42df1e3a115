use tracing::info;

use tillpoint_core::requests::ReplacementRequest;

use crate::api::SubmitReceipt;
use crate::error::ClientResult;
use crate::http::PosClient;

impl PosClient {
    pub async fn submit_replacement(
        &self,
        request: &ReplacementRequest,
    ) -> ClientResult<SubmitReceipt> {
        let (request_id, body) = self.post_json("api/pos/replace/create/", request).await?;
        info!(
            %request_id,
            bill_id = request.bill_id,
            replacement_type = %request.replacement_type,
            lines = request.items.len(),
            payment = request.payment.is_some(),
            refund = request.refund.is_some(),
            "Replacement submitted"
        );
        Ok(SubmitReceipt::new(request_id, body))
    }
}
