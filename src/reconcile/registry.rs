// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bounded set of live [`BalanceFeed`]s keyed by account address.
//!
//! Least recently used feeds are evicted once `capacity` is reached; an
//! evicted account simply starts from the idle snapshot on its next request.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use lru::LruCache;

use super::feed::{BalanceFeed, FailurePolicy};
use super::reconciler::Reconciler;
use super::types::Snapshot;

/// Default number of accounts kept in memory.
pub const DEFAULT_FEED_CAPACITY: usize = 1024;

pub struct FeedRegistry {
    reconciler: Reconciler,
    policy: FailurePolicy,
    feeds: Mutex<LruCache<Address, Arc<BalanceFeed>>>,
}

impl FeedRegistry {
    pub fn new(reconciler: Reconciler, policy: FailurePolicy, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            reconciler,
            policy,
            feeds: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Feed for `address`, creating an idle one if needed.
    pub fn feed(&self, address: Address) -> Arc<BalanceFeed> {
        let mut feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());
        feeds
            .get_or_insert(address, || {
                tracing::debug!(%address, "Creating balance feed");
                Arc::new(BalanceFeed::new(
                    self.reconciler.clone(),
                    Some(address),
                    self.policy,
                ))
            })
            .clone()
    }

    /// Current snapshot for `address`, running the initial cycle on first use.
    pub async fn snapshot(&self, address: Address) -> Arc<Snapshot> {
        let feed = self.feed(address);
        if feed.has_fetched() {
            feed.snapshot()
        } else {
            feed.refetch().await
        }
    }

    /// Run a cycle for `address` and return what it published.
    pub async fn refetch(&self, address: Address) -> Arc<Snapshot> {
        self.feed(address).refetch().await
    }

    /// All live feeds, most recently used first.
    pub fn feeds(&self) -> Vec<Arc<BalanceFeed>> {
        let feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());
        feeds.iter().map(|(_, feed)| feed.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.feeds.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{Deployment, BASE_TIMING};
    use crate::reconcile::testing::{FakeChainReader, ACCOUNT};
    use crate::reconcile::SnapshotStatus;
    use alloy::primitives::address;

    fn registry(reader: Arc<FakeChainReader>, capacity: usize) -> FeedRegistry {
        let reconciler = Reconciler::new(
            reader,
            Deployment::base_mainnet(),
            BASE_TIMING,
            "https://basescan.org",
        );
        FeedRegistry::new(reconciler, FailurePolicy::Reset, capacity)
    }

    #[tokio::test]
    async fn first_snapshot_runs_initial_cycle_once() {
        let reader = Arc::new(FakeChainReader::new().with_balance(1_000_000));
        let registry = registry(reader.clone(), 4);

        let first = registry.snapshot(ACCOUNT).await;
        assert_eq!(first.status, SnapshotStatus::Ready);
        assert_eq!(reader.calls(), 3);

        let second = registry.snapshot(ACCOUNT).await;
        assert_eq!(second, first);
        assert_eq!(reader.calls(), 3);

        registry.refetch(ACCOUNT).await;
        assert_eq!(reader.calls(), 6);
    }

    #[test]
    fn same_address_shares_a_feed() {
        let registry = registry(Arc::new(FakeChainReader::new()), 4);
        let a = registry.feed(ACCOUNT);
        let b = registry.feed(ACCOUNT);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let registry = registry(Arc::new(FakeChainReader::new()), 2);
        let one = address!("1111111111111111111111111111111111111111");
        let two = address!("2222222222222222222222222222222222222222");

        registry.feed(one);
        registry.feed(two);
        registry.feed(ACCOUNT);

        assert_eq!(registry.len(), 2);
        let live: Vec<Option<Address>> = registry.feeds().iter().map(|f| f.address()).collect();
        assert_eq!(live, vec![Some(ACCOUNT), Some(two)]);
    }

    #[test]
    fn zero_capacity_holds_one_feed() {
        let registry = registry(Arc::new(FakeChainReader::new()), 0);
        registry.feed(ACCOUNT);
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }
}
