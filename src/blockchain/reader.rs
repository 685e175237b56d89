// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only chain access used by the reconciler.
//!
//! [`ChainReader`] is the seam between reconciliation and the network: the
//! production implementation talks JSON-RPC through alloy, tests substitute a
//! fake with canned responses.

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

/// A single `eth_call` returning one integer word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRead {
    /// Contract being called
    pub contract: Address,
    /// ABI-encoded selector and arguments
    pub calldata: Bytes,
}

/// Log query for one event type on one contract.
///
/// Every `Some` entry in `indexed` must equal the corresponding topic
/// (`topics[1..=3]`) for a log to match; `None` matches anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    /// Emitting contract
    pub contract: Address,
    /// Event signature hash (`topics[0]`)
    pub event_signature: B256,
    /// Constraints on indexed arguments, in declaration order
    pub indexed: [Option<B256>; 3],
    /// First block to scan; the query always runs to the chain head
    pub from_block: u64,
}

impl LogFilter {
    pub fn new(contract: Address, event_signature: B256, from_block: u64) -> Self {
        Self {
            contract,
            event_signature,
            indexed: [None; 3],
            from_block,
        }
    }

    /// Require indexed argument `position` (0-based) to equal `address`.
    pub fn with_indexed_address(mut self, position: usize, address: Address) -> Self {
        if let Some(slot) = self.indexed.get_mut(position) {
            *slot = Some(address.into_word());
        }
        self
    }

    /// Whether `topics` satisfy the signature and every indexed constraint.
    pub fn matches(&self, topics: &[B256]) -> bool {
        if topics.first() != Some(&self.event_signature) {
            return false;
        }
        self.indexed
            .iter()
            .enumerate()
            .all(|(i, wanted)| match wanted {
                Some(word) => topics.get(i + 1) == Some(word),
                None => true,
            })
    }
}

/// A mined log as returned by the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Emitting contract
    pub address: Address,
    /// Raw topics, signature first
    pub topics: Vec<B256>,
    /// Non-indexed arguments, ABI-encoded
    pub data: Bytes,
    /// Containing block height
    pub block_number: u64,
    /// Position of the log within its block
    pub log_index: u64,
    /// Originating transaction
    pub transaction_hash: B256,
}

/// Errors raised by a [`ChainReader`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainReadError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract error: {0}")]
    Contract(String),
}

/// Read-only view of a chain.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Execute a view call whose return value is a single `uint256`.
    async fn read_value(&self, read: ContractRead) -> Result<U256, ChainReadError>;

    /// All logs matching `filter` from `filter.from_block` to the chain head,
    /// in chain order.
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, ChainReadError>;

    /// Current chain head.
    async fn block_number(&self) -> Result<u64, ChainReadError>;
}
