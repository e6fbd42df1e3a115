//! # State Module
//!
//! Everything the desk remembers between commands.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │                         ┌──────────────┐                                │
//! │                         │   AppState   │                                │
//! │                         └──────┬───────┘                                │
//! │       ┌──────────────┬─────────┼──────────────┬──────────────┐          │
//! │       ▼              ▼         ▼              ▼              ▼          │
//! │  ┌──────────┐ ┌────────────┐ ┌────────────┐ ┌──────────┐ ┌──────────┐  │
//! │  │PosClient │ │ DeskState  │ │TransferSt. │ │StockState│ │Sequencer │  │
//! │  │(session, │ │ Arc<Mutex< │ │ draft,     │ │ racks,   │ │Debouncer │  │
//! │  │ http)    │ │   Desk>>   │ │ sent/recv  │ │ items    │ │          │  │
//! │  └──────────┘ └────────────┘ └────────────┘ └──────────┘ └──────────┘  │
//! │                                                                         │
//! │  LOCKING: a lock is held only to read or apply; never across a request │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod desk;
mod stock;
mod transfer;

pub use desk::DeskState;
pub use stock::StockState;
pub use transfer::TransferState;

use std::sync::{Mutex, MutexGuard};

use tillpoint_client::{Debouncer, PosClient};
use tillpoint_core::{Sequencer, Slot};

use crate::error::{DeskError, DeskResult};

/// Shared handles for every command.
pub struct AppState {
    pub client: PosClient,
    pub desk: DeskState,
    pub transfers: TransferState,
    pub stock: StockState,
    pub sequencer: Sequencer,
    pub product_search: Debouncer,
}

impl AppState {
    pub fn new(client: PosClient, product_search: Debouncer) -> Self {
        AppState {
            client,
            desk: DeskState::new(),
            transfers: TransferState::new(),
            stock: StockState::new(),
            sequencer: Sequencer::new(),
            product_search,
        }
    }

    /// Lookups still in flight for the bill workflow land nowhere after this.
    pub fn drop_bill_lookups(&self) {
        self.sequencer.invalidate(Slot::BillSearch);
        self.sequencer.invalidate(Slot::ProductSearch);
        self.product_search.cancel();
    }

    /// Every in-flight lookup is ignored when it returns.
    pub fn drop_pending(&self) {
        for slot in Slot::ALL {
            self.sequencer.invalidate(slot);
        }
        self.product_search.cancel();
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> DeskResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| DeskError::internal("desk state lock poisoned"))
}
