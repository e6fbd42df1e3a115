use tracing::debug;

use tillpoint_core::validation::validate_search_query;
use tillpoint_core::{BranchStock, CandidateProduct};

use crate::error::ClientResult;
use crate::http::PosClient;
use crate::wire::{Envelope, RawBranchStock, RawProduct};

impl PosClient {
    /// Replacement candidates by name, model or barcode.
    pub async fn search_products(&self, query: &str) -> ClientResult<Vec<CandidateProduct>> {
        let query = validate_search_query(query)?;
        let body = self
            .get_json("api/pos/search-products/", &[("q", query.as_str())])
            .await?;
        let products = Envelope::PRODUCTS.decode::<RawProduct, CandidateProduct>(body)?;
        debug!(%query, count = products.len(), "Product search decoded");
        Ok(products)
    }

    /// Stock of one product in every branch, unfiltered.
    pub async fn branch_stock(&self, product_id: i64) -> ClientResult<Vec<BranchStock>> {
        let path = format!("api/pos/products/{product_id}/branch-stock/");
        let body = self.get_json(&path, &[]).await?;
        Envelope::BRANCH_STOCK.decode::<RawBranchStock, BranchStock>(body)
    }
}
