//! # Endpoint Services
//!
//! Each submodule adds an `impl PosClient` block for one area of the
//! backend. Reads return decoded core types; mutations return a
//! [`SubmitReceipt`] and leave re-fetching to the caller.
//!
//! ```text
//! ┌──────────────┬────────────────────────────────────────────────────────┐
//! │ auth         │ POST api/token/                                        │
//! │ bills        │ GET  api/pos/bills/search/?q=                          │
//! │ returns      │ POST api/pos/bill/return/                              │
//! │ replacements │ POST api/pos/replace/create/                           │
//! │ products     │ GET  api/pos/search-products/?q=                       │
//! │              │ GET  api/pos/products/{id}/branch-stock/               │
//! │ transfers    │ POST api/pos/transfers/create/                         │
//! │              │ GET  api/pos/transfers/sent/ | received/               │
//! │              │ POST api/pos/transfer/update/{id}/                     │
//! │ dues         │ POST api/pos/due/update/                               │
//! │ stock        │ GET  api/pos/racks/ | stock/allocations/               │
//! │              │ POST api/pos/stock/allocate/                           │
//! └──────────────┴────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod bills;
mod dues;
mod products;
mod replacements;
mod returns;
mod stock;
mod transfers;

use serde_json::Value;
use uuid::Uuid;

use crate::wire;

/// What a successful mutation handed back.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    /// The `X-Request-Id` the mutation was sent with.
    pub request_id: Uuid,
    /// Confirmation text, if the backend sent any.
    pub message: Option<String>,
    pub body: Value,
}

impl SubmitReceipt {
    pub(crate) fn new(request_id: Uuid, body: Value) -> Self {
        SubmitReceipt {
            request_id,
            message: wire::success_message(&body),
            body,
        }
    }
}
