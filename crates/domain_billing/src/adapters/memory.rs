//! In-memory bill group store
//!
//! Groups are kept as JSON snapshots, the same shape a document store would
//! hold, so a load always returns an independent copy of what was committed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{BillGroupId, DomainPort, PortError};
use crate::bill_group::UserBillGroup;
use crate::ports::BillGroupStore;

/// Snapshot store backed by a map
#[derive(Debug, Default)]
pub struct InMemoryBillGroupStore {
    snapshots: RwLock<HashMap<BillGroupId, serde_json::Value>>,
    commits: AtomicU64,
    offline: AtomicBool,
}

impl InMemoryBillGroupStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful checkpoints so far
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    /// Makes every following commit fail with a connection error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of groups held
    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

impl DomainPort for InMemoryBillGroupStore {}

#[async_trait]
impl BillGroupStore for InMemoryBillGroupStore {
    async fn load(&self, id: &BillGroupId) -> Result<Option<UserBillGroup>, PortError> {
        let snapshots = self.snapshots.read().await;
        let Some(snapshot) = snapshots.get(id) else {
            return Ok(None);
        };

        serde_json::from_value(snapshot.clone())
            .map(Some)
            .map_err(|e| PortError::serialization(e.to_string()))
    }

    async fn commit(&self, group: &UserBillGroup) -> Result<(), PortError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PortError::connection("in-memory store is offline"));
        }

        let snapshot = serde_json::to_value(group).map_err(|e| PortError::serialization(e.to_string()))?;
        self.snapshots.write().await.insert(group.id(), snapshot);
        let count = self.commits.fetch_add(1, Ordering::SeqCst) + 1;

        debug!(group_id = %group.id(), commits = count, "Committed bill group snapshot");
        Ok(())
    }
}
