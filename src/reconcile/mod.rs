// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance & Transaction Reconciliation
//!
//! Rebuilds an account's aUSDC balance and deposit/withdraw history from
//! chain state and publishes it as a single consistent [`Snapshot`].
//!
//! ## Flow
//!
//! refresh trigger → [`BalanceFeed::refetch`] → [`Reconciler::fetch`]
//! (balance read and both log queries in parallel) → [`EventNormalizer`]
//! per log → merged, newest-first snapshot published on the feed.

pub mod feed;
pub mod normalizer;
pub mod poller;
pub mod reconciler;
pub mod registry;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use feed::{BalanceFeed, FailurePolicy};
pub use normalizer::{DecodeError, DepositedLog, EventNormalizer, WithdrawLog};
pub use poller::{SnapshotPoller, DEFAULT_POLL_CONCURRENCY, DEFAULT_POLL_INTERVAL};
pub use reconciler::{merge_newest_first, ReconcileError, Reconciler};
pub use registry::{FeedRegistry, DEFAULT_FEED_CAPACITY};
pub use types::{Snapshot, SnapshotStatus, TransactionRecord, TransactionType};
