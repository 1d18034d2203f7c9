//! In-memory app version store

use std::sync::{Mutex, MutexGuard, PoisonError};

use appship_core::AppVersion;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Result, StateError};
use crate::store::{newest_first, AppVersionRecord, AppVersionStore};

/// Store backed by a `Vec` kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryAppVersionStore {
    records: Mutex<Vec<AppVersionRecord>>,
}

impl MemoryAppVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, Vec<AppVersionRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

#[async_trait]
impl AppVersionStore for MemoryAppVersionStore {
    async fn create(&self, app_slug: &str, version: AppVersion) -> Result<AppVersionRecord> {
        let record = AppVersionRecord::new(app_slug, version);
        self.records().push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<AppVersionRecord> {
        self.records()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StateError::NotFound(id))
    }

    async fn list_for_app(&self, app_slug: &str) -> Result<Vec<AppVersionRecord>> {
        // Reverse insertion order first so equal timestamps still list newest first.
        let mut found: Vec<_> = self
            .records()
            .iter()
            .rev()
            .filter(|r| r.app_slug == app_slug)
            .cloned()
            .collect();
        newest_first(&mut found);
        Ok(found)
    }

    async fn update(&self, mut record: AppVersionRecord) -> Result<AppVersionRecord> {
        let mut records = self.records();
        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(StateError::NotFound(record.id))?;
        record.created_at = slot.created_at;
        record.updated_at = Utc::now();
        *slot = record.clone();
        Ok(record)
    }
}
