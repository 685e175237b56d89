// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account snapshot endpoints.
//!
//! Both endpoints always answer 200 for a valid address: a failed
//! reconciliation is reported through the snapshot's `status`, with an
//! unknown (`null`) balance, rather than as an HTTP error.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::ApiError,
    models::{parse_address, SnapshotResponse},
    state::AppState,
};

/// Get the current balance and transaction history of an account.
///
/// The first request for an account runs a reconciliation cycle; later
/// requests return the last published snapshot.
#[utoipa::path(
    get,
    path = "/v1/accounts/{address}/snapshot",
    tag = "Accounts",
    params(
        ("address" = String, Path, description = "Account address (0x + 40 hex chars)")
    ),
    responses(
        (status = 200, description = "Current snapshot", body = SnapshotResponse),
        (status = 400, description = "Invalid address")
    )
)]
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let address = parse_address(&address)?;
    let snapshot = state.feeds.snapshot(address).await;
    Ok(Json(SnapshotResponse::from(snapshot.as_ref())))
}

/// Re-run reconciliation for an account and return the new snapshot.
///
/// Intended for pull-to-refresh and for clients that just completed a
/// deposit or withdrawal.
#[utoipa::path(
    post,
    path = "/v1/accounts/{address}/refetch",
    tag = "Accounts",
    params(
        ("address" = String, Path, description = "Account address (0x + 40 hex chars)")
    ),
    responses(
        (status = 200, description = "Snapshot produced by the new cycle", body = SnapshotResponse),
        (status = 400, description = "Invalid address")
    )
)]
pub async fn refetch(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let address = parse_address(&address)?;
    tracing::info!(%address, "Refetch requested");
    let snapshot = state.feeds.refetch(address).await;
    Ok(Json(SnapshotResponse::from(snapshot.as_ref())))
}
