// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted chain and network-tier selection.
//!
//! Both values live under independent keys in the host's
//! [`KeyValueStore`]. Reads fall back to the configured defaults and write
//! them back, so the first read always leaves a persisted selection behind.

use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use regex::Regex;

use crate::error::ConnectorResult;
use crate::models::{ChainSelection, ChainSymbol, NetworkProvider, NetworkTier};
use crate::store::KeyValueStore;

/// Store key for the active chain symbol.
pub const CHAIN_STORAGE_KEY: &str = "active-chain";

/// Store key for the active network tier (or devnet provider).
pub const NETWORK_STORAGE_KEY: &str = "active-prov";

/// `<CHAIN>-<name>` provider strings with a known chain prefix.
static CHAIN_PROVIDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ALGO|ETH|CFX)-[A-Za-z0-9]+$").expect("static regex"));

/// Suffixes that mark a devnet provider.
static DEVNET_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-browser|-live|-devnet)$").expect("static regex"));

/// True for a network tier name or a `<CHAIN>-<name>` provider string.
pub fn validate_provider(provider: &str) -> bool {
    NetworkTier::parse(provider).is_some() || CHAIN_PROVIDER.is_match(provider)
}

/// True when `provider` is a valid provider string that bypasses tier
/// resolution and is passed as the sole SDK bootstrap argument.
pub fn is_devnet_provider(provider: &str) -> bool {
    validate_provider(provider) && DEVNET_SUFFIX.is_match(provider)
}

/// Host hook fired after a tier switch that requested a reload.
pub type ReloadHook = Arc<dyn Fn() + Send + Sync>;

/// Reads and writes the user's [`ChainSelection`].
pub struct EnvironmentStore {
    store: Arc<dyn KeyValueStore>,
    default_chain: ChainSymbol,
    default_network: NetworkProvider,
    reload: RwLock<Option<ReloadHook>>,
}

impl EnvironmentStore {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        default_chain: ChainSymbol,
        default_network: NetworkProvider,
    ) -> Self {
        Self {
            store,
            default_chain,
            default_network,
            reload: RwLock::new(None),
        }
    }

    /// Install the hook used when a tier switch asks for a reload.
    pub fn with_reload_hook(self, hook: ReloadHook) -> Self {
        self.set_reload_hook(hook);
        self
    }

    /// Install or replace the reload hook on a shared store.
    pub fn set_reload_hook(&self, hook: ReloadHook) {
        *self.reload.write().unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Active chain; persists the default when nothing (or garbage) is stored.
    pub fn get_chain(&self) -> ChainSymbol {
        match self.store.get_item(CHAIN_STORAGE_KEY) {
            Some(raw) => match raw.parse() {
                Ok(chain) => chain,
                Err(_) => {
                    tracing::warn!(stored = %raw, "Discarding unsupported persisted chain");
                    self.select_chain(self.default_chain)
                }
            },
            None => self.select_chain(self.default_chain),
        }
    }

    pub fn select_chain(&self, chain: ChainSymbol) -> ChainSymbol {
        self.store.set_item(CHAIN_STORAGE_KEY, chain.as_str());
        chain
    }

    /// Active network; persists the default when nothing (or garbage) is stored.
    pub fn get_network(&self) -> NetworkProvider {
        match self.store.get_item(NETWORK_STORAGE_KEY) {
            Some(raw) => match raw.parse() {
                Ok(network) => network,
                Err(_) => {
                    tracing::warn!(stored = %raw, "Discarding invalid persisted network");
                    self.select_provider(self.default_network.clone(), false)
                }
            },
            None => self.select_provider(self.default_network.clone(), false),
        }
    }

    /// Validate and persist a network tier or devnet provider string.
    ///
    /// With `reload` set, the host reload hook fires after persisting; in a
    /// browser host that call may not return.
    pub fn select_network(&self, network: &str, reload: bool) -> ConnectorResult<NetworkProvider> {
        let provider: NetworkProvider = network.parse()?;
        Ok(self.select_provider(provider, reload))
    }

    /// Persist an already-validated provider.
    pub fn select_provider(&self, provider: NetworkProvider, reload: bool) -> NetworkProvider {
        self.store.set_item(NETWORK_STORAGE_KEY, provider.as_str());
        if reload {
            tracing::info!(network = %provider, "Reloading host after network switch");
            self.request_reload();
        }
        provider
    }

    /// Fire the host reload hook, if one is installed.
    pub fn request_reload(&self) {
        let hook = self.reload.read().unwrap_or_else(PoisonError::into_inner).clone();
        match hook {
            Some(hook) => hook(),
            None => tracing::debug!("Reload requested but no reload hook installed"),
        }
    }

    pub fn selection(&self) -> ChainSelection {
        ChainSelection {
            chain: self.get_chain(),
            network: self.get_network(),
        }
    }

    /// Persist both halves of a selection.
    pub fn persist(&self, selection: &ChainSelection) {
        self.select_chain(selection.chain);
        self.select_provider(selection.network.clone(), false);
    }

    /// Forget the persisted selection.
    pub fn clear(&self) {
        self.store.remove_item(CHAIN_STORAGE_KEY);
        self.store.remove_item(NETWORK_STORAGE_KEY);
    }
}
