use tracing::info;

use tillpoint_core::requests::{TransferCreateRequest, TransferUpdateRequest};
use tillpoint_core::{TransferAction, TransferRequest};

use crate::api::SubmitReceipt;
use crate::error::ClientResult;
use crate::http::PosClient;
use crate::wire::{Envelope, RawTransfer};

impl PosClient {
    pub async fn create_transfer(
        &self,
        request: &TransferCreateRequest,
    ) -> ClientResult<SubmitReceipt> {
        let (request_id, body) = self.post_json("api/pos/transfers/create/", request).await?;
        info!(
            %request_id,
            product_id = request.product_id,
            from_branch_id = request.from_branch_id,
            quantity = request.quantity,
            "Transfer requested"
        );
        Ok(SubmitReceipt::new(request_id, body))
    }

    /// Requests this branch has raised.
    pub async fn sent_transfers(&self) -> ClientResult<Vec<TransferRequest>> {
        let body = self.get_json("api/pos/transfers/sent/", &[]).await?;
        Envelope::TRANSFERS.decode::<RawTransfer, TransferRequest>(body)
    }

    /// Requests addressed to this branch.
    pub async fn received_transfers(&self) -> ClientResult<Vec<TransferRequest>> {
        let body = self.get_json("api/pos/transfers/received/", &[]).await?;
        Envelope::TRANSFERS.decode::<RawTransfer, TransferRequest>(body)
    }

    /// Accepts or rejects a received request. Status is not changed locally;
    /// re-fetch the received list afterwards.
    pub async fn update_transfer(
        &self,
        transfer_id: i64,
        action: TransferAction,
    ) -> ClientResult<SubmitReceipt> {
        let path = format!("api/pos/transfer/update/{transfer_id}/");
        let (request_id, body) = self
            .post_json(&path, &TransferUpdateRequest { action })
            .await?;
        info!(%request_id, transfer_id, %action, "Transfer updated");
        Ok(SubmitReceipt::new(request_id, body))
    }
}
