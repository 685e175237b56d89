// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance & Transaction Reconciler
//!
//! One reconciliation cycle for an account:
//!
//! 1. Read the aUSDC balance, the `Deposited` logs for the recipient and the
//!    `Withdraw` logs where both `user` and `to` are the account, all at once.
//! 2. Wait for all three. If any failed, the cycle failed.
//! 3. Normalize both log streams, concatenate deposits then withdrawals and
//!    stable-sort newest first, so equal timestamps keep chain order.

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::sol_types::{SolCall, SolEvent};
use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use super::normalizer::EventNormalizer;
use super::types::{Snapshot, SnapshotStatus, TransactionRecord, TransactionType};
use crate::blockchain::contracts::{IDepositor, IPool, IERC20};
use crate::blockchain::{
    units_to_decimal, AmountError, ChainReadError, ChainReader, ChainTiming, ContractRead,
    Deployment, LogEntry, LogFilter,
};

/// Errors that fail a whole cycle.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReconcileError {
    #[error("balance read failed: {0}")]
    Balance(ChainReadError),

    #[error("deposit log query failed: {0}")]
    Deposits(ChainReadError),

    #[error("withdraw log query failed: {0}")]
    Withdrawals(ChainReadError),

    #[error("balance out of range: {0}")]
    BalanceRange(#[from] AmountError),
}

/// Runs reconciliation cycles against an injected [`ChainReader`].
///
/// Holds no per-account state; see [`super::BalanceFeed`] for publishing.
#[derive(Clone)]
pub struct Reconciler {
    reader: Arc<dyn ChainReader>,
    deployment: Deployment,
    normalizer: EventNormalizer,
}

impl Reconciler {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        deployment: Deployment,
        timing: ChainTiming,
        explorer_url: &str,
    ) -> Self {
        Self {
            reader,
            normalizer: EventNormalizer::new(timing, explorer_url, deployment.decimals),
            deployment,
        }
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn reader(&self) -> &Arc<dyn ChainReader> {
        &self.reader
    }

    /// Run one cycle and return the resulting snapshot.
    ///
    /// One-shot entry point for callers that do not publish; [`super::BalanceFeed`]
    /// uses it for an unbound feed and [`Self::fetch`] otherwise, since its
    /// failure policy needs the error. Never fails: without an address no chain call is made and the idle
    /// snapshot is returned; a failed cycle yields the unknown snapshot with
    /// status [`SnapshotStatus::Failed`].
    pub async fn reconcile(&self, address: Option<Address>) -> Snapshot {
        let Some(address) = address else {
            return Snapshot::idle(None);
        };

        match self.fetch(address).await {
            Ok(snapshot) => snapshot,
            Err(e) => Snapshot::failed(address, e.to_string()),
        }
    }

    /// Run one cycle, surfacing the failure.
    pub async fn fetch(&self, address: Address) -> Result<Snapshot, ReconcileError> {
        let span = tracing::info_span!("reconcile", cycle = %Uuid::new_v4(), %address);
        self.fetch_inner(address).instrument(span).await
    }

    async fn fetch_inner(&self, address: Address) -> Result<Snapshot, ReconcileError> {
        tracing::debug!("Fetching balance and transactions");

        let balance_read = ContractRead {
            contract: self.deployment.ausdc,
            calldata: IERC20::balanceOfCall { account: address }.abi_encode().into(),
        };
        let deposit_filter = self.deposit_filter(address);
        let withdraw_filter = self.withdraw_filter(address);

        // join, not try_join: every read runs to completion.
        let (balance, deposits, withdrawals) = tokio::join!(
            self.reader.read_value(balance_read),
            self.reader.get_logs(&deposit_filter),
            self.reader.get_logs(&withdraw_filter),
        );

        for (read, result) in [
            ("balance", balance.as_ref().err()),
            ("deposits", deposits.as_ref().err()),
            ("withdrawals", withdrawals.as_ref().err()),
        ] {
            if let Some(e) = result {
                tracing::warn!(read, error = %e, "Reconciliation read failed");
            }
        }

        let raw_balance = balance.map_err(ReconcileError::Balance)?;
        let deposits = deposits.map_err(ReconcileError::Deposits)?;
        let withdrawals = withdrawals.map_err(ReconcileError::Withdrawals)?;

        let balance = units_to_decimal(raw_balance, self.deployment.decimals)?;
        let deposits = self.normalize(&deposit_filter, &deposits, TransactionType::Deposit);
        let withdrawals = self.normalize(&withdraw_filter, &withdrawals, TransactionType::Withdraw);

        let deposit_count = deposits.len();
        let withdraw_count = withdrawals.len();
        let transactions = merge_newest_first(deposits, withdrawals);

        tracing::info!(
            %balance,
            transactions = transactions.len(),
            deposits = deposit_count,
            withdrawals = withdraw_count,
            "Reconciled balance and transactions"
        );

        Ok(Snapshot {
            address: Some(address),
            balance: Some(balance),
            transactions,
            status: SnapshotStatus::Ready,
            fetched_at: Some(Utc::now()),
            error: None,
        })
    }

    fn deposit_filter(&self, address: Address) -> LogFilter {
        LogFilter::new(
            self.deployment.deposit_contract,
            IDepositor::Deposited::SIGNATURE_HASH,
            self.deployment.start_block,
        )
        .with_indexed_address(0, address)
    }

    fn withdraw_filter(&self, address: Address) -> LogFilter {
        LogFilter::new(
            self.deployment.withdraw_contract,
            IPool::Withdraw::SIGNATURE_HASH,
            self.deployment.start_block,
        )
        .with_indexed_address(0, self.deployment.usdc)
        .with_indexed_address(1, address)
        .with_indexed_address(2, address)
    }

    /// Drop logs the filter would not have returned, then normalize.
    fn normalize(
        &self,
        filter: &LogFilter,
        logs: &[LogEntry],
        kind: TransactionType,
    ) -> Vec<TransactionRecord> {
        let matching: Vec<LogEntry> = logs
            .iter()
            .filter(|log| log.address == filter.contract && filter.matches(&log.topics))
            .cloned()
            .collect();

        if matching.len() != logs.len() {
            tracing::debug!(
                kind = %kind,
                excluded = logs.len() - matching.len(),
                "Excluded logs outside the query filter"
            );
        }
        self.normalizer.normalize_all(&matching, kind)
    }
}

/// Deposits then withdrawals, stable-sorted by timestamp descending.
pub fn merge_newest_first(
    deposits: Vec<TransactionRecord>,
    withdrawals: Vec<TransactionRecord>,
) -> Vec<TransactionRecord> {
    let mut all = deposits;
    all.extend(withdrawals);
    all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    all
}
