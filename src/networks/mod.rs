// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Connector Registry
//!
//! Maps a [`ChainSymbol`] to the [`NetworkInterface`] that performs account,
//! asset and transaction lookups for that chain.
//!
//! Lookups never fail: a chain without a registered interface resolves to
//! [`Connector::Unimplemented`], whose methods log the missing operation and
//! return a neutral value.
//!
//! | Chain | Interface |
//! |-------|-----------|
//! | `ALGO` | [`AlgoInterface`] |
//! | `ETH`, `CFX` | unimplemented |

pub mod algo;
pub mod indexer;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

pub use algo::AlgoInterface;
pub use indexer::{AlgoIndexerClient, IndexerService};

use crate::error::ConnectorResult;
use crate::models::{
    AccountInfo, AssetListing, AssetRecord, ChainSymbol, NetworkData, NetworkProvider, TxnPage,
    TxnSearchOpts,
};
use crate::providers::ProviderEnv;
use crate::wallet::WalletFallbackOpts;

/// Per-chain lookups and wallet wiring.
///
/// Read-only lookups absorb upstream failures and return neutral values.
#[async_trait]
pub trait NetworkInterface: Send + Sync {
    fn chain(&self) -> ChainSymbol;

    async fn fetch_account(&self, address: &str) -> Option<AccountInfo>;

    /// Asset metadata, with `amount` set to the holder's balance.
    async fn fetch_asset_by_id(&self, asset_id: u64, amount: u64) -> Option<AssetRecord>;

    /// Apps count plus metadata for at most `limit` holdings.
    async fn load_assets(&self, address: &str, limit: usize) -> AssetListing;

    async fn search_assets_by_name(&self, name: &str) -> Vec<AssetRecord>;

    async fn search_for_transactions(&self, address: &str, opts: &TxnSearchOpts) -> TxnPage;

    fn get_provider_env(&self, network: &NetworkProvider) -> ProviderEnv;

    fn wallet_connect_opts(&self) -> Option<WalletFallbackOpts>;

    fn web_wallet_opts(&self) -> Option<WalletFallbackOpts>;

    /// Tear down any wallet session held for the user.
    async fn disconnect_user(&self) -> ConnectorResult<()>;
}

/// Stand-in for chains without a registered interface.
#[derive(Debug, Clone, Copy)]
pub struct UnimplementedInterface {
    chain: ChainSymbol,
}

impl UnimplementedInterface {
    pub fn new(chain: ChainSymbol) -> Self {
        Self { chain }
    }

    fn unimplemented(&self, operation: &'static str) {
        tracing::warn!(chain = %self.chain, operation, "Connector operation not implemented");
    }
}

#[async_trait]
impl NetworkInterface for UnimplementedInterface {
    fn chain(&self) -> ChainSymbol {
        self.chain
    }

    async fn fetch_account(&self, _address: &str) -> Option<AccountInfo> {
        self.unimplemented("fetch_account");
        None
    }

    async fn fetch_asset_by_id(&self, _asset_id: u64, _amount: u64) -> Option<AssetRecord> {
        self.unimplemented("fetch_asset_by_id");
        None
    }

    async fn load_assets(&self, _address: &str, _limit: usize) -> AssetListing {
        self.unimplemented("load_assets");
        AssetListing::default()
    }

    async fn search_assets_by_name(&self, _name: &str) -> Vec<AssetRecord> {
        self.unimplemented("search_assets_by_name");
        Vec::new()
    }

    async fn search_for_transactions(&self, _address: &str, _opts: &TxnSearchOpts) -> TxnPage {
        self.unimplemented("search_for_transactions");
        TxnPage::default()
    }

    fn get_provider_env(&self, _network: &NetworkProvider) -> ProviderEnv {
        self.unimplemented("get_provider_env");
        ProviderEnv::new()
    }

    fn wallet_connect_opts(&self) -> Option<WalletFallbackOpts> {
        self.unimplemented("wallet_connect_opts");
        None
    }

    fn web_wallet_opts(&self) -> Option<WalletFallbackOpts> {
        self.unimplemented("web_wallet_opts");
        None
    }

    async fn disconnect_user(&self) -> ConnectorResult<()> {
        self.unimplemented("disconnect_user");
        Ok(())
    }
}

/// Outcome of a registry lookup.
#[derive(Clone)]
pub enum Connector {
    Registered(Arc<dyn NetworkInterface>),
    Unimplemented(UnimplementedInterface),
}

impl Connector {
    pub fn chain(&self) -> ChainSymbol {
        match self {
            Connector::Registered(interface) => interface.chain(),
            Connector::Unimplemented(stub) => stub.chain(),
        }
    }

    pub fn is_implemented(&self) -> bool {
        matches!(self, Connector::Registered(_))
    }

    pub fn interface(&self) -> Arc<dyn NetworkInterface> {
        match self {
            Connector::Registered(interface) => interface.clone(),
            Connector::Unimplemented(stub) => Arc::new(*stub),
        }
    }
}

#[derive(Default)]
pub struct ConnectorRegistry {
    interfaces: HashMap<ChainSymbol, Arc<dyn NetworkInterface>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `interface` under its own chain, returning the one it replaced.
    pub fn register(&mut self, interface: Arc<dyn NetworkInterface>) -> Option<Arc<dyn NetworkInterface>> {
        let chain = interface.chain();
        tracing::debug!(%chain, "Registering network interface");
        self.interfaces.insert(chain, interface)
    }

    pub fn resolve(&self, chain: ChainSymbol) -> Connector {
        match self.interfaces.get(&chain) {
            Some(interface) => Connector::Registered(interface.clone()),
            None => Connector::Unimplemented(UnimplementedInterface::new(chain)),
        }
    }

    /// Interface for `chain`; never fails.
    pub fn get(&self, chain: ChainSymbol) -> Arc<dyn NetworkInterface> {
        self.resolve(chain).interface()
    }

    /// Registered chains in declaration order.
    pub fn registered_chains(&self) -> Vec<ChainSymbol> {
        ChainSymbol::ALL
            .into_iter()
            .filter(|chain| self.interfaces.contains_key(chain))
            .collect()
    }

    /// Display data for every registered chain, flagging `active`.
    pub fn list_supported_networks(&self, active: ChainSymbol) -> Vec<NetworkData> {
        self.registered_chains()
            .into_iter()
            .map(|chain| NetworkData {
                active: chain == active,
                ..chain.network_data()
            })
            .collect()
    }
}
