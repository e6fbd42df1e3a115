//! # tillpoint-core: Pure Business Logic for the Tillpoint Desk
//!
//! Everything the return/replace/transfer desk decides, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tillpoint Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/desk (terminal)                         │   │
//! │  │    search ──► bill ──► item ──► return / replace ──► submit     │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────┐  ┌────────────▼────────────────────┐  │
//! │  │  ★ tillpoint-core ★         │  │  tillpoint-client               │  │
//! │  │                             │  │  REST calls, session file,      │  │
//! │  │  ┌───────┐ ┌─────────────┐  │  │  typed decoders                 │  │
//! │  │  │ types │ │ pricing     │  │  └────────────┬────────────────────┘  │
//! │  │  │ money │ │ settlement  │  │               │ HTTPS                 │
//! │  │  └───────┘ └─────────────┘  │               ▼                       │
//! │  │  ┌───────┐ ┌─────────────┐  │        ┌─────────────┐                │
//! │  │  │ flow  │ │ validation  │  │        │  Backend    │                │
//! │  │  └───────┘ └─────────────┘  │        └─────────────┘                │
//! │  │  NO I/O • NO NETWORK        │                                       │
//! │  └─────────────────────────────┘                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Bills, items, products, transfers, racks
//! - [`money`] - Money in paise, decimal wire format
//! - [`pricing`] - Return refunds and replacement deltas
//! - [`settlement`] - Payment / refund tender validation
//! - [`flow`] - Desk state machine and per-action drafts
//! - [`requests`] - Mutation payloads
//! - [`sequencing`] - Stale-response guard
//! - [`validation`] - Input rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **No I/O**: network and file access live in `tillpoint-client`
//! 2. **Integer Money**: all amounts are paise (i64)
//! 3. **Explicit Steps**: an operation on the wrong step is a typed error
//! 4. **Server Owns State**: drafts build requests, they never mutate bills
//!
//! ## Example Usage
//!
//! ```rust
//! use tillpoint_core::money::Money;
//! use tillpoint_core::types::DiscountRate;
//!
//! let new_total = Money::from_rupees(1000);
//! let discount = new_total.percentage(DiscountRate::from_bps(1000)); // 10%
//! assert_eq!(discount, Money::from_rupees(100));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod flow;
pub mod money;
pub mod pricing;
pub mod requests;
pub mod sequencing;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{FlowError, FlowResult, ValidationError};
pub use flow::{Desk, DeskStep};
pub use money::Money;
pub use pricing::{Balance, ReplacementQuote};
pub use sequencing::{Sequencer, Slot, Ticket};
pub use settlement::{Settlement, SettlementMethod};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a bill or product search query.
pub const MAX_QUERY_LEN: usize = 100;

/// Quiet period before a product search is sent.
pub const PRODUCT_SEARCH_DEBOUNCE_MS: u64 = 350;
