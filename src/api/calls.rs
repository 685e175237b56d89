// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Calldata endpoints for the deposit and withdraw payment flows.

use std::str::FromStr;

use axum::{extract::State, Json};
use rust_decimal::Decimal;

use crate::{
    blockchain::{deposit_call, withdraw_call},
    error::ApiError,
    models::{parse_address, DepositCallRequest, PaymentCallResponse, WithdrawCallRequest},
    state::AppState,
};

/// Build the deposit call crediting `recipient`.
#[utoipa::path(
    post,
    path = "/v1/calls/deposit",
    tag = "Calls",
    request_body = DepositCallRequest,
    responses(
        (status = 200, description = "Unsigned deposit call", body = PaymentCallResponse),
        (status = 400, description = "Invalid recipient address")
    )
)]
pub async fn deposit(
    State(state): State<AppState>,
    Json(request): Json<DepositCallRequest>,
) -> Result<Json<PaymentCallResponse>, ApiError> {
    let recipient = parse_address(&request.recipient)?;
    let call = deposit_call(state.deployment(), state.network.chain_id, recipient);
    Ok(Json(call.into()))
}

/// Build the withdraw call returning `amount` USDC to `owner`.
#[utoipa::path(
    post,
    path = "/v1/calls/withdraw",
    tag = "Calls",
    request_body = WithdrawCallRequest,
    responses(
        (status = 200, description = "Unsigned withdraw call", body = PaymentCallResponse),
        (status = 400, description = "Invalid owner address"),
        (status = 422, description = "Invalid amount")
    )
)]
pub async fn withdraw(
    State(state): State<AppState>,
    Json(request): Json<WithdrawCallRequest>,
) -> Result<Json<PaymentCallResponse>, ApiError> {
    let owner = parse_address(&request.owner)?;
    let amount = Decimal::from_str(request.amount.trim())?;
    if amount.is_zero() {
        return Err(ApiError::unprocessable("Amount must be greater than zero"));
    }

    let call = withdraw_call(state.deployment(), state.network.chain_id, owner, amount)?;
    Ok(Json(call.into()))
}
