// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for Base.
//!
//! This module provides functionality for:
//! - Reading contract values and event logs through [`ChainReader`]
//! - Fixed-decimal scaling of USDC amounts
//! - Encoding deposit and withdraw calls for the payment flow

pub mod amount;
pub mod calls;
pub mod client;
pub mod contracts;
pub mod reader;
pub mod types;

pub use amount::{decimal_to_units, units_to_decimal, AmountError};
pub use calls::{deposit_call, withdraw_call, PaymentCall};
pub use client::RpcChainReader;
pub use reader::{ChainReadError, ChainReader, ContractRead, LogEntry, LogFilter};
pub use types::*;
