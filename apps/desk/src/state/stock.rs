//! Racks and stock rows from the last fetch.

use std::sync::Mutex;

use tillpoint_core::{Rack, StockItem};

use super::lock;
use crate::error::DeskResult;

#[derive(Debug, Default)]
pub struct StockState {
    racks: Mutex<Vec<Rack>>,
    items: Mutex<Vec<StockItem>>,
}

impl StockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_racks(&self, racks: Vec<Rack>) -> DeskResult<()> {
        *lock(&self.racks)? = racks;
        Ok(())
    }

    pub fn rack(&self, rack_id: i64) -> DeskResult<Option<Rack>> {
        Ok(lock(&self.racks)?.iter().find(|r| r.id == rack_id).cloned())
    }

    pub fn has_racks(&self) -> DeskResult<bool> {
        Ok(!lock(&self.racks)?.is_empty())
    }

    pub fn set_items(&self, items: Vec<StockItem>) -> DeskResult<()> {
        *lock(&self.items)? = items;
        Ok(())
    }

    pub fn clear(&self) -> DeskResult<()> {
        lock(&self.racks)?.clear();
        lock(&self.items)?.clear();
        Ok(())
    }
}
