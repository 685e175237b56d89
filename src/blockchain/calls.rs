// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Calldata for the deposit and withdraw payment flows.
//!
//! The payment SDK on the client signs and submits these; the service only
//! encodes them.

use alloy::{
    primitives::{Address, Bytes},
    sol_types::SolCall,
};
use rust_decimal::Decimal;

use super::amount::{decimal_to_units, AmountError};
use super::contracts::{IDepositor, IPool};
use super::types::Deployment;

/// An unsigned contract call ready to hand to a wallet or payment SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCall {
    /// Destination chain
    pub chain_id: u64,
    /// Contract to call
    pub to: Address,
    /// ABI-encoded calldata
    pub data: Bytes,
}

/// `deposit(recipientAddr)` on the deposit contract.
pub fn deposit_call(deployment: &Deployment, chain_id: u64, recipient: Address) -> PaymentCall {
    let call = IDepositor::depositCall {
        recipientAddr: recipient,
    };

    PaymentCall {
        chain_id,
        to: deployment.deposit_contract,
        data: call.abi_encode().into(),
    }
}

/// `withdraw(USDC, amount, owner)` on the pool, sending funds back to `owner`.
pub fn withdraw_call(
    deployment: &Deployment,
    chain_id: u64,
    owner: Address,
    amount: Decimal,
) -> Result<PaymentCall, AmountError> {
    let call = IPool::withdrawCall {
        asset: deployment.usdc,
        amount: decimal_to_units(amount, deployment.decimals)?,
        to: owner,
    };

    Ok(PaymentCall {
        chain_id,
        to: deployment.withdraw_contract,
        data: call.abi_encode().into(),
    })
}
