// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-account snapshot publishing.
//!
//! A [`BalanceFeed`] owns the current [`Snapshot`] of one account. Readers get
//! whole snapshots from a `watch` channel, so a balance is never seen next to
//! the transaction list of a different cycle.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::{watch, Mutex};

use super::reconciler::Reconciler;
use super::types::{Snapshot, SnapshotStatus};

/// What a failed cycle publishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Replace the snapshot with the unknown state.
    #[default]
    Reset,
    /// Keep the last balance and transactions, marked as failed.
    KeepLastKnown,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(FailurePolicy::Reset),
            "keep-last-known" | "keep_last_known" => Ok(FailurePolicy::KeepLastKnown),
            other => Err(format!(
                "unknown failure policy `{other}` (expected `reset` or `keep-last-known`)"
            )),
        }
    }
}

/// Published snapshot for one account plus its `refetch` operation.
pub struct BalanceFeed {
    address: Option<Address>,
    reconciler: Reconciler,
    policy: FailurePolicy,
    current: watch::Sender<Arc<Snapshot>>,
    // One cycle at a time per feed.
    refetch_lock: Mutex<()>,
}

impl BalanceFeed {
    pub fn new(reconciler: Reconciler, address: Option<Address>, policy: FailurePolicy) -> Self {
        let (current, _) = watch::channel(Arc::new(Snapshot::idle(address)));
        Self {
            address,
            reconciler,
            policy,
            current,
            refetch_lock: Mutex::new(()),
        }
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.borrow().clone()
    }

    /// Receive every future publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.current.subscribe()
    }

    /// Whether a cycle has completed at least once.
    pub fn has_fetched(&self) -> bool {
        self.current.borrow().fetched_at.is_some()
    }

    /// Run one cycle and publish its result.
    ///
    /// Calls overlapping on the same feed wait for each other, then each runs
    /// its own cycle, so the last caller's result is published last.
    pub async fn refetch(&self) -> Arc<Snapshot> {
        let _guard = self.refetch_lock.lock().await;

        let Some(address) = self.address else {
            return self.publish(self.reconciler.reconcile(None).await);
        };

        let previous = self.snapshot();
        self.publish(previous.with_status(SnapshotStatus::Fetching));

        let next = match self.reconciler.fetch(address).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(%address, error = %e, policy = ?self.policy, "Reconciliation failed");
                let failed = Snapshot::failed(address, e.to_string());
                match self.policy {
                    FailurePolicy::Reset => failed,
                    FailurePolicy::KeepLastKnown => Snapshot {
                        balance: previous.balance,
                        transactions: previous.transactions.clone(),
                        ..failed
                    },
                }
            }
        };

        self.publish(next)
    }

    fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.current.send_replace(snapshot.clone());
        snapshot
    }
}
