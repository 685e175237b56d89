// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::primitives::{address, Address};

/// EVM network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Base mainnet configuration.
pub const BASE_MAINNET: NetworkConfig = NetworkConfig {
    name: "Base",
    chain_id: 8453,
    rpc_url: "https://mainnet.base.org",
    explorer_url: "https://basescan.org",
};

/// Contract addresses and indexing bounds of one Bluestake deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// Underlying stablecoin (the `reserve` of Aave withdraw events).
    pub usdc: Address,
    /// Yield-bearing aUSDC token whose `balanceOf` is the account balance.
    pub ausdc: Address,
    /// Contract emitting `Deposited(recipientAddr, amount)`.
    pub deposit_contract: Address,
    /// Aave pool proxy emitting `Withdraw(reserve, user, to, amount)`.
    pub withdraw_contract: Address,
    /// First block scanned for deposit and withdraw logs.
    pub start_block: u64,
    /// Decimal count shared by USDC and aUSDC.
    pub decimals: u8,
}

impl Deployment {
    /// Production deployment on Base mainnet.
    pub const fn base_mainnet() -> Self {
        Self {
            usdc: address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913"),
            ausdc: address!("4e65fe4dba92790696d040ac24aa414708f5c0ab"),
            deposit_contract: address!("2380f715c3a990c30a69ed871992b0b10187d4c4"),
            withdraw_contract: address!("a238dd80c259a72e81d7e4664a9801593f98d1c5"),
            start_block: 27_990_000,
            decimals: 6,
        }
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self::base_mainnet()
    }
}

/// Fixed block cadence used to turn a block height into wall-clock time.
///
/// This is an approximation: no per-block timestamp is fetched, so a cadence
/// change on the chain makes derived timestamps drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTiming {
    /// Unix time assigned to block 0.
    pub genesis_epoch_secs: u64,
    /// Seconds between consecutive blocks.
    pub seconds_per_block: u64,
}

/// Timing constants for Base mainnet.
pub const BASE_TIMING: ChainTiming = ChainTiming {
    genesis_epoch_secs: 1_686_789_347,
    seconds_per_block: 2,
};

impl ChainTiming {
    /// Unix seconds for `block_number`: `genesis + block * cadence`.
    pub fn timestamp_at(&self, block_number: u64) -> u64 {
        self.genesis_epoch_secs
            .saturating_add(block_number.saturating_mul(self.seconds_per_block))
    }
}

impl Default for ChainTiming {
    fn default() -> Self {
        BASE_TIMING
    }
}
