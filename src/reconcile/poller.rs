// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Snapshot Poller
//!
//! Background task that refreshes every live feed on a fixed interval so
//! balances keep up with yield accrual and payments made elsewhere, without a
//! client having to trigger `refetch`.
//!
//! ## Concurrency
//!
//! At most `max_concurrent` cycles run at once during a sweep, so a full
//! registry does not hit the RPC endpoint with one burst per account.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown. A sweep
//! already in progress finishes its current cycles before the task exits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::registry::FeedRegistry;
use super::types::SnapshotStatus;

/// Default interval between refresh sweeps.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default number of cycles a sweep runs at once.
pub const DEFAULT_POLL_CONCURRENCY: usize = 8;

/// Periodic refresher for all feeds in a [`FeedRegistry`].
pub struct SnapshotPoller {
    registry: Arc<FeedRegistry>,
    poll_interval: Duration,
    permits: Arc<Semaphore>,
}

impl SnapshotPoller {
    pub fn new(registry: Arc<FeedRegistry>, poll_interval: Duration) -> Self {
        Self {
            registry,
            poll_interval,
            permits: Arc::new(Semaphore::new(DEFAULT_POLL_CONCURRENCY)),
        }
    }

    /// Limit a sweep to `limit` concurrent cycles (at least one).
    pub fn with_max_concurrent(mut self, limit: usize) -> Self {
        self.permits = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    /// Run the poller loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            max_concurrent = self.permits.available_permits(),
            "Snapshot poller starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Snapshot poller shutting down");
                    return;
                }
            }

            self.poll_step().await;
        }
    }

    /// Refresh every live feed once. Returns how many cycles failed.
    pub async fn poll_step(&self) -> usize {
        let feeds = self.registry.feeds();
        if feeds.is_empty() {
            return 0;
        }

        let mut tasks = JoinSet::new();
        for feed in feeds.iter().cloned() {
            let permits = self.permits.clone();
            tasks.spawn(async move {
                // The semaphore is never closed.
                let _permit = permits.acquire_owned().await.ok();
                feed.refetch().await
            });
        }

        let mut failed = 0;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(snapshot) if snapshot.status == SnapshotStatus::Failed => failed += 1,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Snapshot poller: refresh task panicked");
                    failed += 1;
                }
            }
        }

        debug!(feeds = feeds.len(), failed, "Snapshot poller: refreshed feeds");
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{Deployment, BASE_TIMING};
    use crate::reconcile::testing::{FakeChainReader, ACCOUNT};
    use crate::reconcile::{FailurePolicy, Reconciler};
    use alloy::primitives::{address, Address};
    use std::sync::atomic::Ordering;

    fn registry(reader: Arc<FakeChainReader>) -> Arc<FeedRegistry> {
        let reconciler = Reconciler::new(
            reader,
            Deployment::base_mainnet(),
            BASE_TIMING,
            "https://basescan.org",
        );
        Arc::new(FeedRegistry::new(reconciler, FailurePolicy::Reset, 8))
    }

    #[tokio::test]
    async fn empty_registry_is_a_no_op() {
        let reader = Arc::new(FakeChainReader::new());
        let poller = SnapshotPoller::new(registry(reader.clone()), DEFAULT_POLL_INTERVAL);
        assert_eq!(poller.poll_step().await, 0);
        assert_eq!(reader.calls(), 0);
    }

    #[tokio::test]
    async fn refreshes_every_feed() {
        let reader = Arc::new(FakeChainReader::new().with_balance(1_000_000));
        let registry = registry(reader.clone());
        registry.feed(ACCOUNT);
        registry.feed(address!("1111111111111111111111111111111111111111"));

        let poller = SnapshotPoller::new(registry.clone(), DEFAULT_POLL_INTERVAL);
        assert_eq!(poller.poll_step().await, 0);
        assert_eq!(reader.calls(), 6);
        assert!(registry.feeds().iter().all(|f| f.has_fetched()));
    }

    #[tokio::test]
    async fn sweep_respects_concurrency_limit() {
        let reader = Arc::new(
            FakeChainReader::new()
                .with_balance(1_000_000)
                .with_delay(Duration::from_millis(20)),
        );
        let registry = registry(reader.clone());
        for byte in 1..=6u8 {
            registry.feed(Address::repeat_byte(byte));
        }

        let poller =
            SnapshotPoller::new(registry.clone(), DEFAULT_POLL_INTERVAL).with_max_concurrent(2);
        assert_eq!(poller.poll_step().await, 0);

        assert_eq!(reader.reads.load(Ordering::SeqCst), 6);
        let peak = reader.max_in_flight_reads();
        assert!((1..=2).contains(&peak), "peak in-flight reads {peak}");
        assert!(registry.feeds().iter().all(|f| f.has_fetched()));
    }

    #[test]
    fn zero_concurrency_still_allows_one_cycle() {
        let poller = SnapshotPoller::new(
            registry(Arc::new(FakeChainReader::new())),
            DEFAULT_POLL_INTERVAL,
        )
        .with_max_concurrent(0);
        assert_eq!(poller.permits.available_permits(), 1);
    }

    #[tokio::test]
    async fn counts_failed_cycles() {
        let reader = Arc::new(FakeChainReader::new());
        reader.fail_withdrawals("unavailable");
        let registry = registry(reader);
        registry.feed(ACCOUNT);

        let poller = SnapshotPoller::new(registry, DEFAULT_POLL_INTERVAL);
        assert_eq!(poller.poll_step().await, 1);
    }

    #[tokio::test]
    async fn stops_on_cancellation() {
        let poller = SnapshotPoller::new(
            registry(Arc::new(FakeChainReader::new())),
            Duration::from_secs(3600),
        );
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(poller.run(shutdown.clone()));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller did not stop")
            .unwrap();
    }
}
