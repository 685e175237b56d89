// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory [`ChainReader`] and log builders for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{address, Address, Bytes, B256, U256};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;

use crate::blockchain::contracts::{IDepositor, IPool};
use crate::blockchain::{ChainReadError, ChainReader, ContractRead, LogEntry, LogFilter};

pub const ACCOUNT: Address = address!("742d35cc6634c0532925a3b844bc9e7595f4ab12");
pub const USDC: Address = address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913");

pub fn amount_data(units: u64) -> Bytes {
    U256::from(units).to_be_bytes::<32>().to_vec().into()
}

pub fn deposited_log(recipient: Address, units: u64, block: u64, hash_byte: u8) -> LogEntry {
    LogEntry {
        address: address!("2380f715c3a990c30a69ed871992b0b10187d4c4"),
        topics: vec![IDepositor::Deposited::SIGNATURE_HASH, recipient.into_word()],
        data: amount_data(units),
        block_number: block,
        log_index: 0,
        transaction_hash: B256::repeat_byte(hash_byte),
    }
}

pub fn withdraw_log(owner: Address, units: u64, block: u64, hash_byte: u8) -> LogEntry {
    LogEntry {
        address: address!("a238dd80c259a72e81d7e4664a9801593f98d1c5"),
        topics: vec![
            IPool::Withdraw::SIGNATURE_HASH,
            USDC.into_word(),
            owner.into_word(),
            owner.into_word(),
        ],
        data: amount_data(units),
        block_number: block,
        log_index: 0,
        transaction_hash: B256::repeat_byte(hash_byte),
    }
}

type Canned<T> = Mutex<Result<T, ChainReadError>>;

/// Chain reader returning canned results and counting calls.
pub struct FakeChainReader {
    balance: Canned<U256>,
    deposits: Canned<Vec<LogEntry>>,
    withdrawals: Canned<Vec<LogEntry>>,
    delay: Mutex<Option<Duration>>,
    pub reads: AtomicUsize,
    pub log_queries: AtomicUsize,
    reads_in_flight: AtomicUsize,
    peak_reads_in_flight: AtomicUsize,
}

impl FakeChainReader {
    pub fn new() -> Self {
        Self {
            balance: Mutex::new(Ok(U256::ZERO)),
            deposits: Mutex::new(Ok(Vec::new())),
            withdrawals: Mutex::new(Ok(Vec::new())),
            delay: Mutex::new(None),
            reads: AtomicUsize::new(0),
            log_queries: AtomicUsize::new(0),
            reads_in_flight: AtomicUsize::new(0),
            peak_reads_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_balance(self, units: u64) -> Self {
        self.set_balance(Ok(U256::from(units)));
        self
    }

    pub fn with_deposits(self, logs: Vec<LogEntry>) -> Self {
        *self.deposits.lock().unwrap() = Ok(logs);
        self
    }

    pub fn with_withdrawals(self, logs: Vec<LogEntry>) -> Self {
        *self.withdrawals.lock().unwrap() = Ok(logs);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn set_balance(&self, result: Result<U256, ChainReadError>) {
        *self.balance.lock().unwrap() = result;
    }

    pub fn fail_withdrawals(&self, message: &str) {
        *self.withdrawals.lock().unwrap() = Err(ChainReadError::Rpc(message.to_string()));
    }

    pub fn set_withdrawals(&self, logs: Vec<LogEntry>) {
        *self.withdrawals.lock().unwrap() = Ok(logs);
    }

    /// Highest number of balance reads observed running at the same time.
    pub fn max_in_flight_reads(&self) -> usize {
        self.peak_reads_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst) + self.log_queries.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ChainReader for FakeChainReader {
    async fn read_value(&self, _read: ContractRead) -> Result<U256, ChainReadError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let now = self.reads_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_reads_in_flight.fetch_max(now, Ordering::SeqCst);
        self.pause().await;
        self.reads_in_flight.fetch_sub(1, Ordering::SeqCst);
        self.balance.lock().unwrap().clone()
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, ChainReadError> {
        self.log_queries.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if filter.event_signature == IDepositor::Deposited::SIGNATURE_HASH {
            self.deposits.lock().unwrap().clone()
        } else if filter.event_signature == IPool::Withdraw::SIGNATURE_HASH {
            self.withdrawals.lock().unwrap().clone()
        } else {
            Ok(Vec::new())
        }
    }

    async fn block_number(&self) -> Result<u64, ChainReadError> {
        self.pause().await;
        Ok(30_000_000)
    }
}
