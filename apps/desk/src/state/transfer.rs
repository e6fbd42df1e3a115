//! Transfer draft plus the last fetched sent/received lists.

use std::sync::Mutex;

use tillpoint_core::flow::TransferDraft;
use tillpoint_core::TransferRequest;

use super::lock;
use crate::error::DeskResult;

#[derive(Debug, Default)]
pub struct TransferState {
    draft: Mutex<Option<TransferDraft>>,
    sent: Mutex<Vec<TransferRequest>>,
    received: Mutex<Vec<TransferRequest>>,
}

impl TransferState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> DeskResult<Option<TransferDraft>> {
        Ok(lock(&self.draft)?.clone())
    }

    pub fn set_draft(&self, draft: Option<TransferDraft>) -> DeskResult<()> {
        *lock(&self.draft)? = draft;
        Ok(())
    }

    /// Runs `f` on the open draft, if there is one.
    pub fn with_draft<T>(
        &self,
        f: impl FnOnce(&mut TransferDraft) -> DeskResult<T>,
    ) -> DeskResult<Option<T>> {
        let mut guard = lock(&self.draft)?;
        guard.as_mut().map(f).transpose()
    }

    pub fn set_sent(&self, list: Vec<TransferRequest>) -> DeskResult<()> {
        *lock(&self.sent)? = list;
        Ok(())
    }

    pub fn set_received(&self, list: Vec<TransferRequest>) -> DeskResult<()> {
        *lock(&self.received)? = list;
        Ok(())
    }

    pub fn received(&self, id: i64) -> DeskResult<Option<TransferRequest>> {
        Ok(lock(&self.received)?.iter().find(|t| t.id == id).cloned())
    }

    pub fn clear(&self) -> DeskResult<()> {
        *lock(&self.draft)? = None;
        lock(&self.sent)?.clear();
        lock(&self.received)?.clear();
        Ok(())
    }
}
