// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC implementation of [`ChainReader`] for Base.

use alloy::{
    network::Ethereum,
    primitives::U256,
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::{Filter, Log, TransactionRequest},
};
use async_trait::async_trait;

use super::reader::{ChainReadError, ChainReader, ContractRead, LogEntry, LogFilter};
use super::types::NetworkConfig;

/// HTTP provider type (with the default fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Chain reader backed by an alloy HTTP provider.
pub struct RpcChainReader {
    /// Network configuration
    network: NetworkConfig,
    /// Alloy HTTP provider
    provider: HttpProvider,
    /// Largest block span per `eth_getLogs` request; `None` issues one request.
    max_block_range: Option<u64>,
}

impl RpcChainReader {
    /// Create a reader for `network`, connecting to `rpc_url`.
    pub fn new(network: NetworkConfig, rpc_url: &str) -> Result<Self, ChainReadError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainReadError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            network,
            provider,
            max_block_range: None,
        })
    }

    /// Split log queries into chunks of at most `blocks` blocks.
    pub fn with_max_block_range(mut self, blocks: Option<u64>) -> Self {
        self.max_block_range = blocks.filter(|b| *b > 0);
        self
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    fn build_filter(filter: &LogFilter) -> Filter {
        let mut rpc_filter = Filter::new()
            .address(filter.contract)
            .event_signature(filter.event_signature);

        if let Some(topic) = filter.indexed[0] {
            rpc_filter = rpc_filter.topic1(topic);
        }
        if let Some(topic) = filter.indexed[1] {
            rpc_filter = rpc_filter.topic2(topic);
        }
        if let Some(topic) = filter.indexed[2] {
            rpc_filter = rpc_filter.topic3(topic);
        }
        rpc_filter
    }

    async fn fetch_range(
        &self,
        filter: Filter,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<Vec<LogEntry>, ChainReadError> {
        let filter = match to_block {
            Some(to) => filter.from_block(from_block).to_block(to),
            None => filter.from_block(from_block),
        };

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| ChainReadError::Rpc(e.to_string()))?;

        Ok(logs.into_iter().filter_map(into_entry).collect())
    }
}

/// Convert an RPC log, dropping logs that are not mined yet.
fn into_entry(log: Log) -> Option<LogEntry> {
    let block_number = log.block_number?;
    let transaction_hash = log.transaction_hash?;
    let log_index = log.log_index.unwrap_or_default();

    Some(LogEntry {
        address: log.address(),
        topics: log.topics().to_vec(),
        data: log.data().data.clone(),
        block_number,
        log_index,
        transaction_hash,
    })
}

/// Consecutive inclusive `(from, to)` spans of at most `size` blocks
/// covering `from..=head`. Empty when `from` is past `head`.
fn block_ranges(from: u64, head: u64, size: u64) -> Vec<(u64, u64)> {
    let mut ranges = Vec::new();
    let mut start = from;
    while start <= head {
        let end = start.saturating_add(size.saturating_sub(1)).min(head);
        ranges.push((start, end));
        match end.checked_add(1) {
            Some(next) => start = next,
            None => break,
        }
    }
    ranges
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn read_value(&self, read: ContractRead) -> Result<U256, ChainReadError> {
        let tx = TransactionRequest::default()
            .to(read.contract)
            .input(read.calldata.into());

        let output = self
            .provider
            .call(tx)
            .await
            .map_err(|e| ChainReadError::Rpc(e.to_string()))?;

        if output.len() < 32 {
            return Err(ChainReadError::Contract(format!(
                "call to {} returned {} bytes, expected a uint256 word",
                read.contract,
                output.len()
            )));
        }
        Ok(U256::from_be_slice(&output[..32]))
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, ChainReadError> {
        let rpc_filter = Self::build_filter(filter);

        let Some(chunk_size) = self.max_block_range else {
            return self.fetch_range(rpc_filter, filter.from_block, None).await;
        };

        let head = self.block_number().await?;
        let mut entries = Vec::new();
        for (from, to) in block_ranges(filter.from_block, head, chunk_size) {
            let chunk = self.fetch_range(rpc_filter.clone(), from, Some(to)).await?;
            if !chunk.is_empty() {
                tracing::debug!(
                    from_block = from,
                    to_block = to,
                    events = chunk.len(),
                    "Fetched log chunk"
                );
            }
            entries.extend(chunk);
        }
        Ok(entries)
    }

    async fn block_number(&self) -> Result<u64, ChainReadError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainReadError::Rpc(e.to_string()))
    }
}
