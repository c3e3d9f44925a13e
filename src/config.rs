// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names and defaults used by the connector. The host
//! application builds a [`ConnectorConfig`] once (usually via
//! [`ConnectorConfig::from_env`]) and passes it to
//! [`ConnectorContext::new`](crate::state::ConnectorContext::new).
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CONNECTOR_DEFAULT_CHAIN` | Chain used when nothing is persisted | `ALGO` |
//! | `CONNECTOR_DEFAULT_NETWORK` | Network tier used when nothing is persisted | `TestNet` |
//! | `CONNECTOR_LOOKUP_TIMEOUT_MS` | Timeout for raced metadata lookups | `3500` |
//! | `CONNECTOR_INITIAL_ASSETS_LIMIT` | Assets loaded during hydration | `10` |
//! | `CONNECTOR_STORE_PATH` | redb file for durable persistence | in-memory |
//! | `ALGO_TOKEN` | Algod API token | empty |
//! | `ALGO_INDEXER_TOKEN` | Algorand indexer API token | empty |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::models::{ChainSymbol, NetworkProvider, NetworkTier, DEFAULT_INITIAL_ASSETS_LIMIT};

/// Environment variable for the chain used when none is persisted.
pub const DEFAULT_CHAIN_ENV: &str = "CONNECTOR_DEFAULT_CHAIN";

/// Environment variable for the network tier used when none is persisted.
pub const DEFAULT_NETWORK_ENV: &str = "CONNECTOR_DEFAULT_NETWORK";

/// Environment variable for the lookup race timeout, in milliseconds.
pub const LOOKUP_TIMEOUT_MS_ENV: &str = "CONNECTOR_LOOKUP_TIMEOUT_MS";

/// Environment variable bounding the asset listing loaded on connect.
pub const INITIAL_ASSETS_LIMIT_ENV: &str = "CONNECTOR_INITIAL_ASSETS_LIMIT";

/// Environment variable for the durable store path.
///
/// # Default
/// Unset: items live in memory for the lifetime of the process.
pub const STORE_PATH_ENV: &str = "CONNECTOR_STORE_PATH";

/// Environment variable for the Algod API token.
pub const ALGO_TOKEN_ENV: &str = "ALGO_TOKEN";

/// Environment variable for the Algorand indexer API token.
pub const ALGO_INDEXER_TOKEN_ENV: &str = "ALGO_INDEXER_TOKEN";

/// Environment variable selecting `json` or `pretty` log output.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default lookup race timeout.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(3500);

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Connector settings resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub default_chain: ChainSymbol,
    pub default_network: NetworkProvider,
    pub lookup_timeout: Duration,
    pub initial_assets_limit: usize,
    pub store_path: Option<PathBuf>,
    pub algo_token: String,
    pub algo_indexer_token: String,
    pub log_format: LogFormat,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            default_chain: ChainSymbol::Algo,
            default_network: NetworkProvider::Tier(NetworkTier::TestNet),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            initial_assets_limit: DEFAULT_INITIAL_ASSETS_LIMIT,
            store_path: None,
            algo_token: String::new(),
            algo_indexer_token: String::new(),
            log_format: LogFormat::default(),
        }
    }
}

impl ConnectorConfig {
    /// Load configuration from the process environment.
    ///
    /// Unparseable values are logged and replaced with their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_chain = parse_or(&lookup, DEFAULT_CHAIN_ENV, defaults.default_chain, |v| {
            v.parse().ok()
        });
        let default_network =
            parse_or(&lookup, DEFAULT_NETWORK_ENV, defaults.default_network, |v| {
                v.parse().ok()
            });
        let lookup_timeout = parse_or(&lookup, LOOKUP_TIMEOUT_MS_ENV, defaults.lookup_timeout, |v| {
            v.parse::<u64>().ok().map(Duration::from_millis)
        });
        let initial_assets_limit = parse_or(
            &lookup,
            INITIAL_ASSETS_LIMIT_ENV,
            defaults.initial_assets_limit,
            |v| v.parse().ok(),
        );
        let log_format = parse_or(&lookup, LOG_FORMAT_ENV, defaults.log_format, |v| {
            match v.to_ascii_lowercase().as_str() {
                "json" => Some(LogFormat::Json),
                "pretty" => Some(LogFormat::Pretty),
                _ => None,
            }
        });

        Self {
            default_chain,
            default_network,
            lookup_timeout,
            initial_assets_limit,
            store_path: lookup(STORE_PATH_ENV)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            algo_token: lookup(ALGO_TOKEN_ENV).unwrap_or_default(),
            algo_indexer_token: lookup(ALGO_INDEXER_TOKEN_ENV).unwrap_or_default(),
            log_format,
        }
    }
}

fn parse_or<F, T, P>(lookup: &F, key: &str, default: T, parse: P) -> T
where
    F: Fn(&str) -> Option<String>,
    P: FnOnce(&str) -> Option<T>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match parse(raw.trim()) {
        Some(value) => value,
        None => {
            tracing::warn!(key, value = %raw, "Ignoring invalid configuration value");
            default
        }
    }
}

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing(config: &ConnectorConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
