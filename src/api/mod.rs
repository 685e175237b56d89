// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        DepositCallRequest, PaymentCallResponse, SnapshotResponse, TransactionView,
        WithdrawCallRequest,
    },
    reconcile::{SnapshotStatus, TransactionType},
    state::AppState,
};

pub mod accounts;
pub mod calls;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/accounts/{address}/snapshot",
            get(accounts::get_snapshot),
        )
        .route("/accounts/{address}/refetch", post(accounts::refetch))
        .route("/calls/deposit", post(calls::deposit))
        .route("/calls/withdraw", post(calls::withdraw))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        accounts::get_snapshot,
        accounts::refetch,
        calls::deposit,
        calls::withdraw
    ),
    components(
        schemas(
            SnapshotResponse,
            SnapshotStatus,
            TransactionView,
            TransactionType,
            DepositCallRequest,
            WithdrawCallRequest,
            PaymentCallResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Accounts", description = "Reconciled balance and transaction history"),
        (name = "Calls", description = "Deposit and withdraw calldata")
    )
)]
struct ApiDoc;
