// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::{ChainReader, ChainTiming, Deployment, NetworkConfig, BASE_MAINNET};
use crate::reconcile::{FailurePolicy, FeedRegistry, Reconciler};

/// How long health checks wait for the chain head before reporting 503.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AppState {
    pub network: NetworkConfig,
    pub feeds: Arc<FeedRegistry>,
    pub health_timeout: Duration,
}

impl AppState {
    pub fn new(network: NetworkConfig, feeds: Arc<FeedRegistry>) -> Self {
        Self {
            network,
            feeds,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// State for Base mainnet around an arbitrary chain reader.
    pub fn with_reader(
        reader: Arc<dyn ChainReader>,
        explorer_url: &str,
        policy: FailurePolicy,
        capacity: usize,
    ) -> Self {
        let reconciler = Reconciler::new(
            reader,
            Deployment::base_mainnet(),
            ChainTiming::default(),
            explorer_url,
        );
        Self::new(
            BASE_MAINNET,
            Arc::new(FeedRegistry::new(reconciler, policy, capacity)),
        )
    }

    pub fn deployment(&self) -> &Deployment {
        self.feeds.reconciler().deployment()
    }

    pub fn reader(&self) -> &Arc<dyn ChainReader> {
        self.feeds.reconciler().reader()
    }
}
