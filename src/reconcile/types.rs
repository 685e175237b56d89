// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reconciliation data model.

use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of a historical position change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdraw,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "deposit"),
            TransactionType::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// One deposit or withdrawal attributable to an account.
///
/// Built once from an immutable chain log and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Unix seconds derived from the block height.
    pub timestamp: u64,
    /// Amount in USDC; zero if the log's amount could not be decoded.
    pub amount_usd: Decimal,
    /// Block explorer link to the originating transaction.
    pub url: String,
    pub kind: TransactionType,
    pub tx_hash: B256,
    pub block_number: u64,
    pub log_index: u64,
}

/// Lifecycle state of a published snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    /// No address bound or nothing fetched yet.
    Idle,
    /// A cycle is running; data is from the previous publish.
    Fetching,
    /// The last cycle succeeded.
    Ready,
    /// The last cycle failed.
    Failed,
}

/// Balance and ordered history published by one reconciliation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub address: Option<Address>,
    /// `None` means unknown, which is not the same as a zero balance.
    pub balance: Option<Decimal>,
    /// Newest first.
    pub transactions: Vec<TransactionRecord>,
    pub status: SnapshotStatus,
    /// Completion time of the cycle that produced this snapshot.
    pub fetched_at: Option<DateTime<Utc>>,
    /// Failure message when `status` is `Failed`.
    pub error: Option<String>,
}

impl Snapshot {
    /// The unknown state: no balance, no transactions.
    pub fn idle(address: Option<Address>) -> Self {
        Self {
            address,
            balance: None,
            transactions: Vec::new(),
            status: SnapshotStatus::Idle,
            fetched_at: None,
            error: None,
        }
    }

    /// The unknown state after a failed cycle.
    pub fn failed(address: Address, error: impl Into<String>) -> Self {
        Self {
            status: SnapshotStatus::Failed,
            fetched_at: Some(Utc::now()),
            error: Some(error.into()),
            ..Self::idle(Some(address))
        }
    }

    /// Same data with a different status.
    pub fn with_status(&self, status: SnapshotStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Whether both balance and history are unknown.
    pub fn is_unknown(&self) -> bool {
        self.balance.is_none() && self.transactions.is_empty()
    }
}
