//! # Desk State
//!
//! The bill workflow (`tillpoint_core::Desk`) behind `Arc<Mutex<_>>`.
//!
//! ```text
//!  command ──► with_desk_mut(|d| d.select_item(3)) ──► lock, apply, unlock
//!  command ──► with_desk(|d| d.return_draft()...build_request()) ──► clone out
//!                 │
//!                 └──► request sent with the lock released
//! ```

use std::sync::{Arc, Mutex};

use tillpoint_core::Desk;

use super::lock;
use crate::error::DeskResult;

#[derive(Debug, Clone, Default)]
pub struct DeskState {
    inner: Arc<Mutex<Desk>>,
}

impl DeskState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access.
    pub fn with_desk<T>(&self, f: impl FnOnce(&Desk) -> T) -> DeskResult<T> {
        let desk = lock(&self.inner)?;
        Ok(f(&desk))
    }

    /// Write access. The closure's own result is flattened into the return.
    pub fn with_desk_mut<T, E>(&self, f: impl FnOnce(&mut Desk) -> Result<T, E>) -> DeskResult<T>
    where
        E: Into<crate::error::DeskError>,
    {
        let mut desk = lock(&self.inner)?;
        f(&mut desk).map_err(Into::into)
    }

    pub fn snapshot(&self) -> DeskResult<Desk> {
        self.with_desk(Desk::clone)
    }
}
