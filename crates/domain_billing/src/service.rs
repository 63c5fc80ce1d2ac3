//! Bill split service
//!
//! The service is the layer a host application talks to. It owns the live
//! bill groups, serialises access to each of them, and checkpoints every
//! accepted mutation through the injected [`BillGroupStore`].
//!
//! # Concurrency
//!
//! Each group sits behind its own `RwLock`. Bills are owned by their group,
//! so the group lock also guards them. A mutation holds the write lock for
//! its whole validate, commit and swap sequence; reads take the read lock
//! and never observe a half-applied change.
//!
//! # Copy and swap
//!
//! Mutations are applied to a copy of the group. The copy replaces the live
//! group only after the store has accepted it, so neither a validation
//! failure nor a store failure changes what readers see.
//!
//! Groups stay in memory once opened until [`BillSplitService::close_group`]
//! drops them.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use core_kernel::{BillGroupId, BillId, UserId};
use crate::amount::SplitAmount;
use crate::bill::UserBill;
use crate::bill_group::UserBillGroup;
use crate::config::BillSplitConfig;
use crate::error::BillingError;
use crate::ports::BillGroupStore;
use crate::settlement::Settlement;

type GroupHandle = Arc<RwLock<UserBillGroup>>;

/// Application service for shared household bills
pub struct BillSplitService {
    store: Arc<dyn BillGroupStore>,
    config: BillSplitConfig,
    groups: RwLock<HashMap<BillGroupId, GroupHandle>>,
}

impl BillSplitService {
    /// Creates a service over the given store
    pub fn new(store: Arc<dyn BillGroupStore>, config: BillSplitConfig) -> Self {
        Self {
            store,
            config,
            groups: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &BillSplitConfig {
        &self.config
    }

    /// Creates and checkpoints an empty group
    #[instrument(skip_all)]
    pub async fn create_group(&self, name: Option<String>) -> Result<BillGroupId, BillingError> {
        let mut group = UserBillGroup::new();
        if let Some(name) = name {
            group.set_name(name);
        }

        let group_id = group.id();
        if let Err(e) = self.store.commit(&group).await {
            warn!(%group_id, error = %e, "Checkpoint failed, group not created");
            return Err(e.into());
        }

        self.groups
            .write()
            .await
            .insert(group_id, Arc::new(RwLock::new(group)));

        info!(%group_id, "Created bill group");
        Ok(group_id)
    }

    /// Makes a previously committed group available to this service
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the store has no such group
    #[instrument(skip(self))]
    pub async fn open_group(&self, group_id: BillGroupId) -> Result<(), BillingError> {
        self.handle(group_id).await.map(|_| ())
    }

    /// Drops a group from this service's working set
    ///
    /// Every accepted mutation is already committed, so nothing is lost: the
    /// next access reloads the group from the store. Returns false if the
    /// group was not open.
    #[instrument(skip(self))]
    pub async fn close_group(&self, group_id: BillGroupId) -> bool {
        let closed = self.groups.write().await.remove(&group_id).is_some();
        if closed {
            debug!(%group_id, "Closed bill group");
        }
        closed
    }

    /// Number of groups currently held by the service
    pub async fn open_group_count(&self) -> usize {
        self.groups.read().await.len()
    }

    #[instrument(skip_all, fields(group_id = %group_id))]
    pub async fn rename_group(&self, group_id: BillGroupId, name: String) -> Result<(), BillingError> {
        self.mutate(group_id, "rename_group", move |group| {
            group.set_name(name);
            Ok(())
        })
        .await
    }

    #[instrument(skip_all, fields(group_id = %group_id, payor = %payor, weight = weight))]
    pub async fn add_or_update_payor(
        &self,
        group_id: BillGroupId,
        payor: UserId,
        weight: i64,
    ) -> Result<(), BillingError> {
        self.mutate(group_id, "add_or_update_payor", move |group| {
            group.add_or_update_payor(payor, weight)
        })
        .await
    }

    /// Removes a payor, returning their weight
    #[instrument(skip_all, fields(group_id = %group_id, payor = %payor))]
    pub async fn remove_payor(&self, group_id: BillGroupId, payor: UserId) -> Result<u64, BillingError> {
        self.mutate(group_id, "remove_payor", move |group| group.remove_payor(&payor))
            .await
    }

    #[instrument(skip_all, fields(group_id = %group_id, bill_id = %bill.id(), payor = %payor))]
    pub async fn add_bill(
        &self,
        group_id: BillGroupId,
        bill: UserBill,
        payor: UserId,
    ) -> Result<BillId, BillingError> {
        self.mutate(group_id, "add_bill", move |group| group.add_bill(bill, payor))
            .await
    }

    #[instrument(skip_all, fields(group_id = %group_id, bill_id = %bill_id, value = value))]
    pub async fn set_charge(
        &self,
        group_id: BillGroupId,
        bill_id: BillId,
        value: i64,
    ) -> Result<(), BillingError> {
        self.mutate(group_id, "set_charge", move |group| group.set_charge(&bill_id, value))
            .await
    }

    #[instrument(skip_all, fields(group_id = %group_id, bill_id = %bill_id, amount = amount))]
    pub async fn add_adjustment(
        &self,
        group_id: BillGroupId,
        bill_id: BillId,
        amount: i64,
        reason: String,
    ) -> Result<(), BillingError> {
        self.mutate(group_id, "add_adjustment", move |group| {
            group.add_adjustment(&bill_id, amount, reason)
        })
        .await
    }

    #[instrument(skip_all, fields(group_id = %group_id, bill_id = %bill_id, active = active))]
    pub async fn set_bill_active(
        &self,
        group_id: BillGroupId,
        bill_id: BillId,
        active: bool,
    ) -> Result<(), BillingError> {
        self.mutate(group_id, "set_bill_active", move |group| {
            group.set_bill_active(&bill_id, active)
        })
        .await
    }

    /// Returns the payors in the roster
    pub async fn payors(&self, group_id: BillGroupId) -> Result<Vec<UserId>, BillingError> {
        self.read(group_id, |group| Ok(group.payors().copied().collect()))
            .await
    }

    /// Returns a copy of a bill in the group
    pub async fn bill(&self, group_id: BillGroupId, bill_id: BillId) -> Result<UserBill, BillingError> {
        self.read(group_id, |group| {
            group
                .bill(&bill_id)
                .cloned()
                .ok_or_else(|| BillingError::BillNotFound(bill_id.to_string()))
        })
        .await
    }

    /// Returns a copy of the whole group
    pub async fn snapshot(&self, group_id: BillGroupId) -> Result<UserBillGroup, BillingError> {
        self.read(group_id, |group| Ok(group.clone())).await
    }

    pub async fn contribution_for(&self, group_id: BillGroupId, payor: UserId) -> Result<i128, BillingError> {
        self.read(group_id, |group| group.contribution_for(&payor)).await
    }

    pub async fn contribution_total(&self, group_id: BillGroupId) -> Result<i128, BillingError> {
        self.read(group_id, |group| Ok(group.contribution_total())).await
    }

    #[instrument(skip(self))]
    pub async fn liability_for(&self, group_id: BillGroupId, payor: UserId) -> Result<SplitAmount, BillingError> {
        self.read(group_id, |group| group.calculate_liability_for(&payor))
            .await
    }

    #[instrument(skip(self))]
    pub async fn settlement(&self, group_id: BillGroupId) -> Result<Settlement<UserId>, BillingError> {
        self.read(group_id, |group| group.settlement()).await
    }

    /// Liabilities rounded to the configured settlement scale
    pub async fn rounded_liabilities(&self, group_id: BillGroupId) -> Result<Vec<(UserId, Decimal)>, BillingError> {
        let scale = self.config.settlement_scale;
        self.read(group_id, |group| group.settlement()?.rounded_liabilities(scale))
            .await
    }

    async fn handle(&self, group_id: BillGroupId) -> Result<GroupHandle, BillingError> {
        if let Some(handle) = self.groups.read().await.get(&group_id) {
            return Ok(handle.clone());
        }

        let loaded = self
            .store
            .load(&group_id)
            .await?
            .ok_or_else(|| BillingError::GroupNotFound(group_id.to_string()))?;
        debug!(%group_id, "Loaded bill group from store");

        // another task may have loaded the same group in the meantime
        let mut groups = self.groups.write().await;
        Ok(groups
            .entry(group_id)
            .or_insert_with(|| Arc::new(RwLock::new(loaded)))
            .clone())
    }

    async fn read<T, F>(&self, group_id: BillGroupId, query: F) -> Result<T, BillingError>
    where
        F: FnOnce(&UserBillGroup) -> Result<T, BillingError>,
    {
        let handle = self.handle(group_id).await?;
        let group = handle.read().await;
        query(&group)
    }

    async fn mutate<T, F>(
        &self,
        group_id: BillGroupId,
        operation: &'static str,
        apply: F,
    ) -> Result<T, BillingError>
    where
        F: FnOnce(&mut UserBillGroup) -> Result<T, BillingError> + Send,
        T: Send,
    {
        let handle = self.handle(group_id).await?;
        let mut group = handle.write().await;

        let mut draft = group.clone();
        let value = match apply(&mut draft) {
            Ok(value) => value,
            Err(e) => {
                debug!(%group_id, operation, error = %e, "Rejected mutation");
                return Err(e);
            }
        };

        if let Err(e) = self.store.commit(&draft).await {
            warn!(%group_id, operation, error = %e, "Checkpoint failed, mutation discarded");
            return Err(e.into());
        }

        *group = draft;
        if self.config.verify_balance {
            verify_balance(&group);
        }

        Ok(value)
    }
}

fn verify_balance(group: &UserBillGroup) {
    match group.settlement() {
        Ok(settlement) if settlement.is_balanced => {}
        Ok(settlement) => error!(
            group_id = %group.id(),
            liability_total = %settlement.liability_total,
            "Bill group liabilities do not sum to zero"
        ),
        Err(e) => error!(group_id = %group.id(), error = %e, "Could not settle bill group"),
    }
}
