//! # pb-store-memory
//!
//! In-process implementation of `PasteStore`.
//! Records live in a sharded concurrent map; the per-entry lock makes the
//! conditional replace atomic for a single id.

use async_trait::async_trait;
use dashmap::DashMap;
use pb_core::error::Result;
use pb_core::models::PasteRecord;
use pb_core::traits::PasteStore;

#[derive(Debug, Default)]
pub struct MemoryPasteStore {
    pastes: DashMap<String, PasteRecord>,
}

impl MemoryPasteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pastes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pastes.is_empty()
    }
}

#[async_trait]
impl PasteStore for MemoryPasteStore {
    async fn put(&self, record: &PasteRecord) -> Result<()> {
        self.pastes.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<PasteRecord>> {
        Ok(self.pastes.get(id).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.pastes.remove(id);
        Ok(())
    }

    async fn replace_if_views(&self, record: &PasteRecord, expected_views: u64) -> Result<bool> {
        let Some(mut entry) = self.pastes.get_mut(&record.id) else {
            return Ok(false);
        };
        if entry.views != expected_views {
            return Ok(false);
        }
        *entry = record.clone();
        Ok(true)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
