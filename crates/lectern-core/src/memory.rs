//! Bounded, persisted recency cache of region snapshots.
//!
//! The whole sequence is stored under one key and rewritten in full on every
//! change. In-memory state is updated first; if the write fails the in-memory
//! list stays authoritative for the rest of the session.

use crate::config::ViewerConfig;
use crate::error::PersistenceError;
use crate::snapshot::{PendingRegion, RegionSnapshot};
use crate::storage::{Storage, StorageError};
use std::sync::Arc;
use uuid::Uuid;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Most recent snapshots plus how many more are stored.
#[derive(Debug, Clone, Copy)]
pub struct RecentRegions<'a> {
    pub recent: &'a [RegionSnapshot],
    pub remaining: usize,
}

/// Recency-ordered snapshot memory shared across sessions.
pub struct RegionMemory<S: Storage> {
    /// Storage backend.
    storage: Arc<S>,
    key: String,
    capacity: usize,
    preview: usize,
    /// Newest first.
    entries: Vec<RegionSnapshot>,
}

impl<S: Storage> RegionMemory<S> {
    /// Create an empty memory. Call [`RegionMemory::load`] to restore state.
    pub fn new(storage: Arc<S>, config: &ViewerConfig) -> Self {
        Self {
            storage,
            key: config.memory_key.clone(),
            capacity: config.memory_capacity.max(1),
            preview: config.memory_preview,
            entries: Vec::new(),
        }
    }

    /// Replace in-memory state with the stored sequence.
    ///
    /// A missing record is an empty memory. A failed read or an unparsable
    /// record is reported and leaves the in-memory list untouched.
    pub async fn load(&mut self) -> Result<&[RegionSnapshot], PersistenceError> {
        let mut entries = match self.storage.load(&self.key).await {
            Ok(json) => serde_json::from_str::<Vec<RegionSnapshot>>(&json)
                .map_err(|e| PersistenceError::Read(e.to_string()))?,
            Err(StorageError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(PersistenceError::Read(e.to_string())),
        };

        entries.truncate(self.capacity);
        log::info!("Restored {} region snapshot(s)", entries.len());
        self.entries = entries;
        Ok(self.entries.as_slice())
    }

    /// Write the whole sequence, replacing the stored record.
    pub async fn persist(&self) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(&self.entries)
            .map_err(|e| PersistenceError::Write(e.to_string()))?;
        self.storage
            .save(&self.key, &json)
            .await
            .map_err(|e| PersistenceError::Write(e.to_string()))
    }

    /// Add a snapshot as the most recent entry, evicting beyond capacity.
    ///
    /// Persistence failures are logged; the snapshot is kept in memory either way.
    pub async fn record(&mut self, pending: PendingRegion) -> RegionSnapshot {
        let snapshot = RegionSnapshot {
            id: format!("region_{}", Uuid::new_v4().simple()),
            document_id: pending.document_id,
            page_number: pending.page_number,
            rect: pending.rect,
            image: pending.image,
            created_at: now_millis(),
        };

        self.entries.insert(0, snapshot.clone());
        self.entries.truncate(self.capacity);

        if let Err(e) = self.persist().await {
            log::error!("{}; keeping region memory in memory only", e);
        }
        snapshot
    }

    /// The first few snapshots and the count of the rest.
    pub fn list(&self) -> RecentRegions<'_> {
        let shown = self.entries.len().min(self.preview);
        RecentRegions {
            recent: &self.entries[..shown],
            remaining: self.entries.len() - shown,
        }
    }

    /// Look up a snapshot for reuse. An unknown id yields `None`.
    pub fn reuse(&self, id: &str) -> Option<&RegionSnapshot> {
        self.entries.iter().find(|s| s.id == id)
    }

    /// Forget everything, in memory and in storage.
    pub async fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.storage.delete(&self.key).await {
            log::error!("{}", PersistenceError::Remove(e.to_string()));
        }
    }

    /// All snapshots, newest first.
    pub fn entries(&self) -> &[RegionSnapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
