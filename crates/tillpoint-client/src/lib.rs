//! # tillpoint-client: Backend Access for the Tillpoint Desk
//!
//! Everything that talks to the POS backend lives here: the HTTP transport
//! with bearer auth, the persisted session, one typed decoder per endpoint
//! and the endpoint services the desk calls.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         tillpoint-client                                │
//! │                                                                         │
//! │   apps/desk ──► PosClient::search_bills / submit_return / ...  (api/)  │
//! │                      │                                                  │
//! │                      ├──► http.rs    Bearer auth, 401 refresh, ids     │
//! │                      │        │                                         │
//! │                      │        └──► SessionContext ──► SessionStore      │
//! │                      │                               (session.json)     │
//! │                      └──► wire.rs    envelopes ──► tillpoint-core types │
//! │                                                                         │
//! │   ClientConfig (defaults → desk.toml → TILLPOINT_* env)                │
//! │   Debouncer    (product search while typing)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use tillpoint_client::{ClientConfig, PosClient, SessionContext};
//!
//! # async fn demo() -> tillpoint_client::ClientResult<()> {
//! let config = ClientConfig::load(None)?;
//! let client = PosClient::new(&config, Arc::new(SessionContext::in_memory()))?;
//! client.login("cashier1", "secret").await?;
//! let bills = client.search_bills("INV-1042").await?;
//! # let _ = bills;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod debounce;
pub mod error;
pub mod http;
pub mod session;
pub mod wire;

pub use api::SubmitReceipt;
pub use config::ClientConfig;
pub use debounce::Debouncer;
pub use error::{ClientError, ClientResult};
pub use http::{PosClient, REQUEST_ID_HEADER};
pub use session::{FileSessionStore, MemorySessionStore, SessionContext, SessionData, SessionStore};
