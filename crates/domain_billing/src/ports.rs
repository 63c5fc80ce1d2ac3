//! Billing Domain Ports
//!
//! The engine never reaches for a database. Whatever makes bill groups
//! durable implements [`BillGroupStore`] and is handed to the
//! [`BillSplitService`](crate::service::BillSplitService) at startup.
//!
//! # Checkpoint contract
//!
//! - Every accepted mutation is followed by exactly one `commit`
//! - A rejected mutation never reaches the store
//! - If `commit` fails, the in-memory group keeps its previous state
//!
//! ```rust,ignore
//! let store: Arc<dyn BillGroupStore> = Arc::new(InMemoryBillGroupStore::new());
//! let service = BillSplitService::new(store, BillSplitConfig::default());
//! ```

use async_trait::async_trait;

use core_kernel::{BillGroupId, DomainPort, PortError};
use crate::bill_group::UserBillGroup;

/// Persistence collaborator for bill groups
#[async_trait]
pub trait BillGroupStore: DomainPort {
    /// Loads a previously committed group
    ///
    /// Returns `Ok(None)` if no group with this id has been committed.
    async fn load(&self, id: &BillGroupId) -> Result<Option<UserBillGroup>, PortError>;

    /// Durability checkpoint for a group that has just been mutated
    async fn commit(&self, group: &UserBillGroup) -> Result<(), PortError>;
}
