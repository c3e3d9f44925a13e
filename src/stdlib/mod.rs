// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Chain SDK Capabilities
//!
//! The connector never depends on a concrete chain SDK. It talks to an
//! instance through [`StdLib`], which lists exactly the calls this crate
//! makes, and constructs instances through a host-supplied [`StdLibLoader`].
//!
//! Instances are owned by the [`StdLibManager`]: one default slot plus any
//! number of named slots.

pub mod manager;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

pub use manager::{LoadOptions, ProviderOverride, StdLibManager, DEFAULT_INSTANCE_KEY};

use crate::error::ConnectorResult;
use crate::models::{ChainSymbol, NetworkProvider};
use crate::providers::ProviderEnv;
use crate::wallet::{WalletFallbackOpts, WalletProvider};

/// A connected network account handle.
#[async_trait]
pub trait Account: Send + Sync {
    /// Raw address as reported by the SDK.
    fn address(&self) -> String;

    /// Token metadata as reported by the account's own connector.
    async fn token_metadata(&self, token_id: &str) -> ConnectorResult<Option<serde_json::Value>>;

    /// Whether the account has opted in to `token_id`.
    async fn token_accepted(&self, token_id: &str) -> ConnectorResult<bool>;

    /// Opt the account in to `token_id`.
    async fn token_accept(&self, token_id: &str) -> ConnectorResult<()>;
}

/// Wallet fallback produced by the SDK from [`WalletFallbackOpts`].
#[derive(Debug, Clone)]
pub struct WalletFallback {
    pub provider: WalletProvider,
    pub provider_env: ProviderEnv,
}

/// The SDK surface this crate relies on.
#[async_trait]
pub trait StdLib: Send + Sync {
    /// Active chain of this instance.
    fn connector(&self) -> ChainSymbol;

    /// Balance in atomic units; `token` selects a non-native asset.
    async fn balance_of(&self, account: &dyn Account, token: Option<&str>) -> ConnectorResult<u128>;

    fn format_address(&self, account: &dyn Account) -> String;

    fn format_with_decimals(&self, atomic_units: u128, decimals: u32) -> String;

    fn parse_currency(&self, amount: &str, decimals: u32) -> ConnectorResult<u128>;

    async fn get_default_account(&self) -> ConnectorResult<Arc<dyn Account>>;

    async fn connect_account(&self, address: &str) -> ConnectorResult<Arc<dyn Account>>;

    fn set_provider_by_name(&self, network: &NetworkProvider) -> ConnectorResult<()>;

    fn set_provider_by_env(&self, env: &ProviderEnv) -> ConnectorResult<()>;

    fn wallet_fallback(&self, opts: WalletFallbackOpts) -> WalletFallback;

    fn set_wallet_fallback(&self, fallback: WalletFallback) -> ConnectorResult<()>;

    fn provider_env_by_name(&self, network: &NetworkProvider) -> ProviderEnv;
}

/// Argument handed to the SDK bootstrap function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapArgs {
    /// Devnet provider string, used as the only argument.
    Devnet(String),
    /// Structured connector-mode descriptor.
    Connector {
        connector_mode: ChainSymbol,
        no_warn: bool,
    },
}

impl BootstrapArgs {
    pub fn connector(chain: ChainSymbol) -> Self {
        BootstrapArgs::Connector {
            connector_mode: chain,
            no_warn: false,
        }
    }
}

impl fmt::Display for BootstrapArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapArgs::Devnet(raw) => f.write_str(raw),
            BootstrapArgs::Connector { connector_mode, .. } => write!(f, "{connector_mode}"),
        }
    }
}

/// Host-supplied SDK bootstrap.
pub trait StdLibLoader: Send + Sync {
    fn load(&self, args: BootstrapArgs) -> ConnectorResult<Arc<dyn StdLib>>;

    /// Lift the SDK's single-instance restriction. Called once, before the
    /// first unique instance is constructed.
    fn allow_multiple_instances(&self) {}
}
