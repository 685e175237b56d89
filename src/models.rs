// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures used by the REST API. All types derive
//! `ToSchema` for OpenAPI documentation.
//!
//! Decimal amounts travel as strings so no precision is lost to JSON floats.
//! Addresses are returned in checksummed form.

use std::str::FromStr;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::PaymentCall;
use crate::error::ApiError;
use crate::reconcile::{Snapshot, SnapshotStatus, TransactionRecord, TransactionType};

// =============================================================================
// Account Address
// =============================================================================

/// Parse a `0x`-prefixed, 40 hex character account address.
///
/// All-lowercase and all-uppercase input is accepted as is; mixed-case input
/// must carry a valid EIP-55 checksum.
pub fn parse_address(raw: &str) -> Result<Address, ApiError> {
    let raw = raw.trim();
    let hex = raw
        .strip_prefix("0x")
        .ok_or_else(|| ApiError::bad_request("Address must start with 0x"))?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ApiError::bad_request(
            "Address must be 0x followed by 40 hex characters",
        ));
    }

    let mixed_case = hex.chars().any(|c| c.is_ascii_lowercase())
        && hex.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case {
        Address::parse_checksummed(raw, None)
            .map_err(|_| ApiError::bad_request("Address checksum is invalid"))
    } else {
        Address::from_str(raw).map_err(|e| ApiError::bad_request(format!("Invalid address: {e}")))
    }
}

// =============================================================================
// Snapshot Models
// =============================================================================

/// A deposit or withdrawal in an account's history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TransactionView {
    /// Unix seconds, derived from the block height
    pub timestamp: u64,
    /// Same instant as `timestamp`, RFC 3339
    pub occurred_at: Option<DateTime<Utc>>,
    /// USDC amount, decimal string
    #[serde(with = "rust_decimal::serde::str")]
    #[schema(value_type = String, example = "1.5")]
    pub amount_usd: Decimal,
    /// Block explorer link
    pub url: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub tx_hash: String,
    pub block_number: u64,
}

impl From<&TransactionRecord> for TransactionView {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            occurred_at: i64::try_from(record.timestamp)
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            amount_usd: record.amount_usd,
            url: record.url.clone(),
            kind: record.kind,
            tx_hash: format!("{:#x}", record.tx_hash),
            block_number: record.block_number,
        }
    }
}

/// Published balance and history of one account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SnapshotResponse {
    /// Checksummed account address
    pub address: Option<String>,
    pub status: SnapshotStatus,
    /// aUSDC balance, decimal string; `null` when unknown
    #[serde(with = "rust_decimal::serde::str_option")]
    #[schema(value_type = Option<String>, example = "12.345678")]
    pub balance: Option<Decimal>,
    /// Newest first
    pub transactions: Vec<TransactionView>,
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl From<&Snapshot> for SnapshotResponse {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            address: snapshot.address.map(|a| a.to_checksum(None)),
            status: snapshot.status,
            balance: snapshot.balance,
            transactions: snapshot.transactions.iter().map(TransactionView::from).collect(),
            fetched_at: snapshot.fetched_at,
            error: snapshot.error.clone(),
        }
    }
}

// =============================================================================
// Payment Call Models
// =============================================================================

/// Request calldata for a deposit into the yield position.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepositCallRequest {
    /// Account credited with the deposit
    pub recipient: String,
}

/// Request calldata for a withdrawal back to the owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawCallRequest {
    /// Account withdrawing, also the receiver of the USDC
    pub owner: String,
    /// USDC amount, decimal string with at most 6 fractional digits
    #[schema(example = "25.5")]
    pub amount: String,
}

/// Unsigned contract call for the client's wallet or payment SDK.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PaymentCallResponse {
    pub chain_id: u64,
    /// Checksummed contract address
    pub to: String,
    /// `0x`-prefixed calldata
    pub data: String,
}

impl From<PaymentCall> for PaymentCallResponse {
    fn from(call: PaymentCall) -> Self {
        Self {
            chain_id: call.chain_id,
            to: call.to.to_checksum(None),
            data: format!("0x{}", alloy::hex::encode(&call.data)),
        }
    }
}
