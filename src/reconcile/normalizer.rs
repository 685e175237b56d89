// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Event Normalizer
//!
//! Turns raw `Deposited` and `Withdraw` logs into [`TransactionRecord`]s.
//!
//! Each event type has a strict schema. A log whose topics do not fit the
//! schema is not one of ours and is excluded. A log whose topics fit but whose
//! amount word is missing or out of range still produces a record, with a zero
//! amount, so one bad log cannot take down the rest of the history.

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolEvent;

use rust_decimal::Decimal;

use super::types::{TransactionRecord, TransactionType};
use crate::blockchain::contracts::{IDepositor, IPool};
use crate::blockchain::{units_to_decimal, AmountError, ChainTiming, LogEntry};

/// Errors decoding a log against its event schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("event signature {0} does not match the schema")]
    Signature(B256),

    #[error("expected {expected} topics, found {found}")]
    TopicCount { expected: usize, found: usize },

    #[error("topic {0} is not an address")]
    NotAnAddress(usize),

    #[error("amount field is malformed ({0} data bytes)")]
    MalformedAmount(usize),

    #[error(transparent)]
    AmountRange(#[from] AmountError),
}

impl DecodeError {
    /// Whether only the amount failed; the topics matched the schema.
    pub fn is_amount(&self) -> bool {
        matches!(self, DecodeError::MalformedAmount(_) | DecodeError::AmountRange(_))
    }
}

/// `Deposited(address indexed recipientAddr, uint256 amount)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositedLog {
    pub recipient_addr: Address,
    pub amount: U256,
}

/// `Withdraw(address indexed reserve, address indexed user, address indexed to, uint256 amount)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawLog {
    pub reserve: Address,
    pub user: Address,
    pub to: Address,
    pub amount: U256,
}

impl DepositedLog {
    pub fn decode(log: &LogEntry) -> Result<Self, DecodeError> {
        check_layout(log, IDepositor::Deposited::SIGNATURE_HASH, 2)?;
        Ok(Self {
            recipient_addr: topic_address(&log.topics, 1)?,
            amount: amount_word(&log.data)?,
        })
    }
}

impl WithdrawLog {
    pub fn decode(log: &LogEntry) -> Result<Self, DecodeError> {
        check_layout(log, IPool::Withdraw::SIGNATURE_HASH, 4)?;
        Ok(Self {
            reserve: topic_address(&log.topics, 1)?,
            user: topic_address(&log.topics, 2)?,
            to: topic_address(&log.topics, 3)?,
            amount: amount_word(&log.data)?,
        })
    }
}

fn check_layout(log: &LogEntry, signature: B256, topic_count: usize) -> Result<(), DecodeError> {
    match log.topics.first() {
        Some(topic) if *topic == signature => {}
        Some(topic) => return Err(DecodeError::Signature(*topic)),
        None => {
            return Err(DecodeError::TopicCount {
                expected: topic_count,
                found: 0,
            })
        }
    }
    if log.topics.len() != topic_count {
        return Err(DecodeError::TopicCount {
            expected: topic_count,
            found: log.topics.len(),
        });
    }
    // Topics decode before the amount so a bad layout is never mistaken for a
    // bad amount.
    for index in 1..topic_count {
        topic_address(&log.topics, index)?;
    }
    Ok(())
}

/// An indexed address is a 32-byte word with 12 leading zero bytes.
fn topic_address(topics: &[B256], index: usize) -> Result<Address, DecodeError> {
    let word = topics.get(index).ok_or(DecodeError::NotAnAddress(index))?;
    if word[..12].iter().any(|b| *b != 0) {
        return Err(DecodeError::NotAnAddress(index));
    }
    Ok(Address::from_slice(&word[12..]))
}

fn amount_word(data: &[u8]) -> Result<U256, DecodeError> {
    if data.len() != 32 {
        return Err(DecodeError::MalformedAmount(data.len()));
    }
    Ok(U256::from_be_slice(data))
}

/// Pure conversion of schema-checked logs into transaction records.
#[derive(Debug, Clone)]
pub struct EventNormalizer {
    timing: ChainTiming,
    explorer_url: String,
    decimals: u8,
}

impl EventNormalizer {
    pub fn new(timing: ChainTiming, explorer_url: impl Into<String>, decimals: u8) -> Self {
        Self {
            timing,
            explorer_url: explorer_url.into().trim_end_matches('/').to_string(),
            decimals,
        }
    }

    /// Block explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: &B256) -> String {
        format!("{}/tx/{:#x}", self.explorer_url, tx_hash)
    }

    /// Normalize one log as `kind`.
    ///
    /// Returns `None` when the log does not fit the event schema of `kind`.
    pub fn normalize(&self, log: &LogEntry, kind: TransactionType) -> Option<TransactionRecord> {
        let decoded = match kind {
            TransactionType::Deposit => DepositedLog::decode(log).map(|e| e.amount),
            TransactionType::Withdraw => WithdrawLog::decode(log).map(|e| e.amount),
        };

        let amount = decoded
            .and_then(|units| units_to_decimal(units, self.decimals).map_err(DecodeError::from));

        let amount_usd = match amount {
            Ok(amount) => amount,
            Err(e) if e.is_amount() => {
                tracing::warn!(
                    tx_hash = %log.transaction_hash,
                    log_index = log.log_index,
                    kind = %kind,
                    error = %e,
                    "Failed to decode event amount, recording zero"
                );
                Decimal::ZERO
            }
            Err(e) => {
                tracing::debug!(
                    tx_hash = %log.transaction_hash,
                    log_index = log.log_index,
                    kind = %kind,
                    error = %e,
                    "Excluding log that does not match the event schema"
                );
                return None;
            }
        };

        Some(TransactionRecord {
            timestamp: self.timing.timestamp_at(log.block_number),
            amount_usd,
            url: self.tx_url(&log.transaction_hash),
            kind,
            tx_hash: log.transaction_hash,
            block_number: log.block_number,
            log_index: log.log_index,
        })
    }

    /// Normalize a batch, preserving chain order and dropping schema misfits.
    pub fn normalize_all(&self, logs: &[LogEntry], kind: TransactionType) -> Vec<TransactionRecord> {
        logs.iter()
            .filter_map(|log| self.normalize(log, kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::BASE_TIMING;
    use crate::reconcile::testing::{deposited_log, withdraw_log, ACCOUNT, USDC};
    use alloy::primitives::Bytes;
    use rust_decimal_macros::dec;

    fn normalizer() -> EventNormalizer {
        EventNormalizer::new(BASE_TIMING, "https://basescan.org/", 6)
    }

    #[test]
    fn decodes_deposited_schema() {
        let log = deposited_log(ACCOUNT, 2_500_000, 30_000_000, 0x11);
        let decoded = DepositedLog::decode(&log).unwrap();
        assert_eq!(decoded.recipient_addr, ACCOUNT);
        assert_eq!(decoded.amount, U256::from(2_500_000u64));
    }

    #[test]
    fn decodes_withdraw_schema() {
        let log = withdraw_log(ACCOUNT, 1_000_000, 30_000_000, 0x22);
        let decoded = WithdrawLog::decode(&log).unwrap();
        assert_eq!(decoded.reserve, USDC);
        assert_eq!(decoded.user, ACCOUNT);
        assert_eq!(decoded.to, ACCOUNT);
        assert_eq!(decoded.amount, U256::from(1_000_000u64));
    }

    #[test]
    fn normalizes_deposit() {
        let log = deposited_log(ACCOUNT, 1_500_000, 28_000_000, 0xab);
        let record = normalizer().normalize(&log, TransactionType::Deposit).unwrap();

        assert_eq!(record.timestamp, 1_686_789_347 + 28_000_000 * 2);
        assert_eq!(record.amount_usd, dec!(1.5));
        assert_eq!(record.kind, TransactionType::Deposit);
        assert_eq!(
            record.url,
            format!("https://basescan.org/tx/0x{}", "ab".repeat(32))
        );
    }

    #[test]
    fn normalization_is_deterministic() {
        let n = normalizer();
        let log = withdraw_log(ACCOUNT, 42_000_000, 29_123_456, 0x07);
        let first = n.normalize(&log, TransactionType::Withdraw);
        let second = n.normalize(&log, TransactionType::Withdraw);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_amount_degrades_to_zero() {
        let mut log = deposited_log(ACCOUNT, 1, 28_000_000, 0x01);
        log.data = Bytes::from(vec![0u8; 5]);
        let record = normalizer().normalize(&log, TransactionType::Deposit).unwrap();
        assert_eq!(record.amount_usd, Decimal::ZERO);

        log.data = Bytes::new();
        let record = normalizer().normalize(&log, TransactionType::Deposit).unwrap();
        assert_eq!(record.amount_usd, Decimal::ZERO);
    }

    #[test]
    fn out_of_range_amount_degrades_to_zero() {
        let mut log = deposited_log(ACCOUNT, 1, 28_000_000, 0x01);
        log.data = U256::MAX.to_be_bytes::<32>().to_vec().into();
        let record = normalizer().normalize(&log, TransactionType::Deposit).unwrap();
        assert_eq!(record.amount_usd, Decimal::ZERO);
    }

    #[test]
    fn schema_misfits_are_excluded() {
        let n = normalizer();

        // A withdraw log is not a deposit.
        let withdraw = withdraw_log(ACCOUNT, 1_000_000, 28_000_000, 0x01);
        assert!(n.normalize(&withdraw, TransactionType::Deposit).is_none());

        // Missing indexed topic.
        let mut short = withdraw.clone();
        short.topics.truncate(3);
        assert!(n.normalize(&short, TransactionType::Withdraw).is_none());

        // Dirty high bytes in an address topic.
        let mut dirty = deposited_log(ACCOUNT, 1_000_000, 28_000_000, 0x02);
        dirty.topics[1] = B256::repeat_byte(0xff);
        assert_eq!(DepositedLog::decode(&dirty), Err(DecodeError::NotAnAddress(1)));
        assert!(n.normalize(&dirty, TransactionType::Deposit).is_none());

        // Layout errors take precedence over a bad amount.
        let mut both = dirty.clone();
        both.data = Bytes::new();
        assert!(n.normalize(&both, TransactionType::Deposit).is_none());
    }

    #[test]
    fn normalize_all_keeps_chain_order() {
        let logs = vec![
            deposited_log(ACCOUNT, 1_000_000, 100, 0x01),
            withdraw_log(ACCOUNT, 1_000_000, 150, 0x02),
            deposited_log(ACCOUNT, 2_000_000, 200, 0x03),
        ];
        let records = normalizer().normalize_all(&logs, TransactionType::Deposit);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].block_number, 100);
        assert_eq!(records[1].block_number, 200);
    }
}
