// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Default connection parameters per chain and network tier.

use super::ProviderEnv;
use crate::models::{ChainSymbol, NetworkTier};

pub const ALGO_SERVER: &str = "ALGO_SERVER";
pub const ALGO_PORT: &str = "ALGO_PORT";
pub const ALGO_TOKEN: &str = "ALGO_TOKEN";
pub const ALGO_INDEXER_SERVER: &str = "ALGO_INDEXER_SERVER";
pub const ALGO_INDEXER_PORT: &str = "ALGO_INDEXER_PORT";
pub const ALGO_INDEXER_TOKEN: &str = "ALGO_INDEXER_TOKEN";
pub const ETH_NODE_URI: &str = "ETH_NODE_URI";
pub const CFX_NODE_URI: &str = "CFX_NODE_URI";
pub const ISOLATED_NETWORK: &str = "REACH_ISOLATED_NETWORK";

/// API tokens injected into generated environments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderTokens {
    pub algod: String,
    pub indexer: String,
}

/// Tiers a chain actually offers. Only Algorand runs a BetaNet.
pub fn supported_tier(chain: ChainSymbol, tier: NetworkTier) -> NetworkTier {
    match (chain, tier) {
        (ChainSymbol::Algo, tier) => tier,
        (_, NetworkTier::BetaNet) => NetworkTier::TestNet,
        (_, tier) => tier,
    }
}

/// Build the default environment for `chain` on `tier`.
pub fn provider_env_for(chain: ChainSymbol, tier: NetworkTier, tokens: &ProviderTokens) -> ProviderEnv {
    match chain {
        ChainSymbol::Algo => algorand_env(tier, tokens),
        ChainSymbol::Eth => {
            let uri = match supported_tier(chain, tier) {
                NetworkTier::MainNet => "https://ethereum-rpc.publicnode.com",
                _ => "https://ethereum-sepolia-rpc.publicnode.com",
            };
            ProviderEnv::from_pairs([(ETH_NODE_URI, uri), (ISOLATED_NETWORK, "no")])
        }
        ChainSymbol::Cfx => {
            let uri = match supported_tier(chain, tier) {
                NetworkTier::MainNet => "https://main.confluxrpc.com",
                _ => "https://test.confluxrpc.com",
            };
            ProviderEnv::from_pairs([(CFX_NODE_URI, uri), (ISOLATED_NETWORK, "no")])
        }
    }
}

fn algorand_env(tier: NetworkTier, tokens: &ProviderTokens) -> ProviderEnv {
    let host = tier.as_str().to_lowercase();
    ProviderEnv::from_pairs([
        (ALGO_SERVER, format!("https://{host}-api.algonode.cloud").as_str()),
        (ALGO_PORT, "443"),
        (ALGO_TOKEN, tokens.algod.as_str()),
        (ALGO_INDEXER_SERVER, format!("https://{host}-idx.algonode.cloud").as_str()),
        (ALGO_INDEXER_PORT, "443"),
        (ALGO_INDEXER_TOKEN, tokens.indexer.as_str()),
        (ISOLATED_NETWORK, "no"),
    ])
}
