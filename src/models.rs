// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Core data model: chains, network tiers, selections and query records.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::stdlib::Account;

// =============================================================================
// Chains
// =============================================================================

/// Supported blockchain symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainSymbol {
    #[serde(rename = "ALGO")]
    Algo,
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "CFX")]
    Cfx,
}

impl ChainSymbol {
    pub const ALL: [ChainSymbol; 3] = [ChainSymbol::Algo, ChainSymbol::Eth, ChainSymbol::Cfx];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainSymbol::Algo => "ALGO",
            ChainSymbol::Eth => "ETH",
            ChainSymbol::Cfx => "CFX",
        }
    }

    /// Chains whose SDK connector selects a network in a second step.
    pub fn is_algorand_like(&self) -> bool {
        matches!(self, ChainSymbol::Algo)
    }

    /// Static display data for this chain.
    pub fn network_data(&self) -> NetworkData {
        let (name, decimals) = match self {
            ChainSymbol::Algo => ("Algorand", 6),
            ChainSymbol::Eth => ("Ethereum", 18),
            ChainSymbol::Cfx => ("Conflux", 18),
        };
        NetworkData {
            name: name.to_string(),
            abbr: *self,
            decimals,
            active: false,
        }
    }

    pub fn decimals(&self) -> u32 {
        self.network_data().decimals
    }
}

impl fmt::Display for ChainSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainSymbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALGO" => Ok(ChainSymbol::Algo),
            "ETH" => Ok(ChainSymbol::Eth),
            "CFX" => Ok(ChainSymbol::Cfx),
            other => Err(format!("Unsupported chain symbol: {other}")),
        }
    }
}

/// Display data for one supported network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkData {
    pub name: String,
    pub abbr: ChainSymbol,
    pub decimals: u32,
    #[serde(default)]
    pub active: bool,
}

// =============================================================================
// Network tiers and providers
// =============================================================================

/// Deployment environment for a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkTier {
    TestNet,
    MainNet,
    BetaNet,
}

impl NetworkTier {
    pub const ALL: [NetworkTier; 3] = [NetworkTier::TestNet, NetworkTier::MainNet, NetworkTier::BetaNet];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkTier::TestNet => "TestNet",
            NetworkTier::MainNet => "MainNet",
            NetworkTier::BetaNet => "BetaNet",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        NetworkTier::ALL.into_iter().find(|tier| tier.as_str() == value)
    }
}

impl fmt::Display for NetworkTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network selection: either a regular tier or a devnet bypass string
/// (e.g. `ALGO-devnet`) that is handed verbatim to the SDK bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum NetworkProvider {
    Tier(NetworkTier),
    Devnet(String),
}

impl NetworkProvider {
    pub fn as_str(&self) -> &str {
        match self {
            NetworkProvider::Tier(tier) => tier.as_str(),
            NetworkProvider::Devnet(raw) => raw,
        }
    }

    pub fn tier(&self) -> Option<NetworkTier> {
        match self {
            NetworkProvider::Tier(tier) => Some(*tier),
            NetworkProvider::Devnet(_) => None,
        }
    }

    pub fn is_devnet(&self) -> bool {
        matches!(self, NetworkProvider::Devnet(_))
    }
}

impl Default for NetworkProvider {
    fn default() -> Self {
        NetworkProvider::Tier(NetworkTier::TestNet)
    }
}

impl From<NetworkTier> for NetworkProvider {
    fn from(tier: NetworkTier) -> Self {
        NetworkProvider::Tier(tier)
    }
}

impl fmt::Display for NetworkProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkProvider {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(tier) = NetworkTier::parse(s) {
            return Ok(NetworkProvider::Tier(tier));
        }
        if crate::environment::is_devnet_provider(s) {
            return Ok(NetworkProvider::Devnet(s.to_string()));
        }
        Err(ConnectorError::InvalidProvider(s.to_string()))
    }
}

impl TryFrom<String> for NetworkProvider {
    type Error = ConnectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NetworkProvider> for String {
    fn from(provider: NetworkProvider) -> Self {
        provider.as_str().to_string()
    }
}

/// The user's persisted chain and network choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSelection {
    pub chain: ChainSymbol,
    pub network: NetworkProvider,
}

// =============================================================================
// Indexer records
// =============================================================================

/// One asset holding on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetHolding {
    pub asset_id: u64,
    pub amount: u64,
}

/// Account details as reported by the chain indexer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub address: String,
    pub amount: u64,
    pub assets: Vec<AssetHolding>,
    pub created_apps: Vec<u64>,
}

/// Normalized asset metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: u64,
    pub amount: u64,
    pub decimals: u32,
    pub name: String,
    pub symbol: String,
    pub supply: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Count of applications created by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppsCount {
    pub length: usize,
    pub description: String,
}

impl AppsCount {
    pub fn new(length: usize) -> Self {
        let plural = if length == 1 { "app" } else { "apps" };
        Self {
            length,
            description: format!("{length} {plural} created"),
        }
    }
}

/// Result of loading an account's asset listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetListing {
    pub apps_count: AppsCount,
    pub assets: Vec<AssetRecord>,
}

impl Default for AssetListing {
    fn default() -> Self {
        Self {
            apps_count: AppsCount::new(0),
            assets: Vec::new(),
        }
    }
}

/// Filters for a transaction search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnSearchOpts {
    /// Match transactions that moved exactly this amount.
    pub amount: Option<u64>,
    pub min_round: Option<u64>,
    /// Note prefix (plain text).
    pub note: Option<String>,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
}

/// A page of raw transaction records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxnPage {
    pub current_round: u64,
    pub next_token: Option<String>,
    pub transactions: Vec<serde_json::Value>,
}

// =============================================================================
// User session
// =============================================================================

/// Options for hydrating a connected user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOpts {
    pub fetch_assets: bool,
    pub fetch_balance: bool,
    pub initial_assets_limit: usize,
}

/// Default asset listing bound during hydration.
pub const DEFAULT_INITIAL_ASSETS_LIMIT: usize = 10;

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            fetch_assets: true,
            fetch_balance: true,
            initial_assets_limit: DEFAULT_INITIAL_ASSETS_LIMIT,
        }
    }
}

/// A freshly hydrated user session. Only `address` is ever persisted.
#[derive(Clone)]
pub struct ConnectedUserData {
    pub account: Arc<dyn Account>,
    pub address: String,
    /// Native-currency balance, formatted with the chain's decimals.
    pub balance: String,
    /// `None` when asset loading was not requested.
    pub assets: Option<AssetListing>,
}

impl fmt::Debug for ConnectedUserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectedUserData")
            .field("address", &self.address)
            .field("balance", &self.balance)
            .field("assets", &self.assets)
            .finish_non_exhaustive()
    }
}

/// Token descriptor returned by token metadata helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub url: String,
    pub amount: u128,
    pub supply: String,
    pub decimals: u32,
    pub verified: bool,
}
