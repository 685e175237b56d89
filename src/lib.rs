// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bluestake - USDC Yield Position Reconciliation Service
//!
//! Reconstructs an account's aUSDC balance and its deposit/withdraw history
//! on Base from contract reads and event logs, and serves the result over
//! HTTP.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Base contract bindings, chain reads and calldata
//! - `reconcile` - Event normalization, reconciliation cycles and feeds
//! - `config` - Environment configuration

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod state;
