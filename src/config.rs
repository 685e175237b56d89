// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `RPC_URL` | Base JSON-RPC endpoint | `https://mainnet.base.org` |
//! | `EXPLORER_URL` | Block explorer used for transaction links | `https://basescan.org` |
//! | `POLL_INTERVAL_SECS` | Background refresh interval, `0` disables | `30` |
//! | `POLL_CONCURRENCY` | Cycles a refresh sweep runs at once | `8` |
//! | `FEED_CAPACITY` | Accounts kept in memory | `1024` |
//! | `LOG_BLOCK_RANGE` | Max blocks per `eth_getLogs` request, unset = one request | unset |
//! | `FAILURE_POLICY` | `reset` or `keep-last-known` | `reset` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::time::Duration;

use crate::blockchain::BASE_MAINNET;
use crate::reconcile::{
    FailurePolicy, DEFAULT_FEED_CAPACITY, DEFAULT_POLL_CONCURRENCY, DEFAULT_POLL_INTERVAL,
};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const EXPLORER_URL_ENV: &str = "EXPLORER_URL";
pub const POLL_INTERVAL_ENV: &str = "POLL_INTERVAL_SECS";
pub const POLL_CONCURRENCY_ENV: &str = "POLL_CONCURRENCY";
pub const FEED_CAPACITY_ENV: &str = "FEED_CAPACITY";
pub const LOG_BLOCK_RANGE_ENV: &str = "LOG_BLOCK_RANGE";
pub const FAILURE_POLICY_ENV: &str = "FAILURE_POLICY";

/// Environment variable selecting `json` or `pretty` log output.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value `{value}`: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rpc_url: String,
    pub explorer_url: String,
    /// `None` disables background refresh.
    pub poll_interval: Option<Duration>,
    /// Clamped to at least one.
    pub poll_concurrency: usize,
    pub feed_capacity: usize,
    pub log_block_range: Option<u64>,
    pub failure_policy: FailurePolicy,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            rpc_url: BASE_MAINNET.rpc_url.to_string(),
            explorer_url: BASE_MAINNET.explorer_url.to_string(),
            poll_interval: Some(DEFAULT_POLL_INTERVAL),
            poll_concurrency: DEFAULT_POLL_CONCURRENCY,
            feed_capacity: DEFAULT_FEED_CAPACITY,
            log_block_range: None,
            failure_policy: FailurePolicy::Reset,
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let poll_interval = match parse::<u64>(POLL_INTERVAL_ENV, get(POLL_INTERVAL_ENV))? {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.poll_interval,
        };

        let failure_policy = match get(FAILURE_POLICY_ENV) {
            Some(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                name: FAILURE_POLICY_ENV,
                value,
                reason,
            })?,
            None => defaults.failure_policy,
        };

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(value) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value,
                    reason: "expected `json` or `pretty`".to_string(),
                })
            }
            None => defaults.log_format,
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or(defaults.host),
            port: parse(PORT_ENV, get(PORT_ENV))?.unwrap_or(defaults.port),
            rpc_url: get(RPC_URL_ENV).unwrap_or(defaults.rpc_url),
            explorer_url: get(EXPLORER_URL_ENV).unwrap_or(defaults.explorer_url),
            poll_interval,
            poll_concurrency: parse::<usize>(POLL_CONCURRENCY_ENV, get(POLL_CONCURRENCY_ENV))?
                .unwrap_or(defaults.poll_concurrency)
                .max(1),
            feed_capacity: parse(FEED_CAPACITY_ENV, get(FEED_CAPACITY_ENV))?
                .unwrap_or(defaults.feed_capacity),
            log_block_range: parse::<u64>(LOG_BLOCK_RANGE_ENV, get(LOG_BLOCK_RANGE_ENV))?
                .filter(|blocks| *blocks > 0),
            failure_policy,
            log_format,
        })
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.rpc_url, "https://mainnet.base.org");
        assert_eq!(config.explorer_url, "https://basescan.org");
        assert_eq!(config.poll_interval, Some(Duration::from_secs(30)));
        assert_eq!(config.poll_concurrency, 8);
        assert_eq!(config.feed_capacity, 1024);
        assert_eq!(config.log_block_range, None);
        assert_eq!(config.failure_policy, FailurePolicy::Reset);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("RPC_URL", "http://localhost:8545"),
            ("POLL_INTERVAL_SECS", "0"),
            ("POLL_CONCURRENCY", "3"),
            ("FEED_CAPACITY", "16"),
            ("LOG_BLOCK_RANGE", "5000"),
            ("FAILURE_POLICY", "keep-last-known"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.poll_interval, None);
        assert_eq!(config.poll_concurrency, 3);
        assert_eq!(config.feed_capacity, 16);
        assert_eq!(config.log_block_range, Some(5000));
        assert_eq!(config.failure_policy, FailurePolicy::KeepLastKnown);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn blank_and_zero_values_fall_back_to_defaults() {
        let config = load(&[
            ("PORT", "  "),
            ("LOG_BLOCK_RANGE", "0"),
            ("POLL_CONCURRENCY", "0"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.poll_concurrency, 1);
        assert_eq!(config.log_block_range, None);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().starts_with("PORT has an invalid value `eighty`"));

        assert!(load(&[("FAILURE_POLICY", "retry")]).is_err());
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
