// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Connector Context
//!
//! The object a host application constructs once and passes down. It owns
//! the persisted chain selection, the provider resolver, the per-chain
//! network interfaces and the SDK instance slots.
//!
//! The Algorand indexer client is bound to the network selected when the
//! context is built. A network switch with `reload` set is expected to tear
//! the host down and build a fresh context.

use std::sync::Arc;

use crate::account::Hydrator;
use crate::config::ConnectorConfig;
use crate::environment::{EnvironmentStore, ReloadHook};
use crate::error::ConnectorResult;
use crate::models::{
    ChainSelection, ChainSymbol, ConnectOpts, NetworkData, NetworkProvider, NetworkTier,
    TokenMetadata,
};
use crate::networks::{AlgoIndexerClient, AlgoInterface, ConnectorRegistry, IndexerService, NetworkInterface};
use crate::providers::{provider_env_for, supported_tier, ProviderEnv, ProviderResolver, ProviderTokens};
use crate::stdlib::{Account, StdLibManager};
use crate::store::{open_store, KeyValueStore};
use crate::tokens;
use crate::wallet::{TransportFactory, WalletSession};

pub struct ConnectorContext {
    config: ConnectorConfig,
    environment: Arc<EnvironmentStore>,
    resolver: Arc<ProviderResolver>,
    manager: StdLibManager,
    registry: ConnectorRegistry,
    indexer: Arc<dyn IndexerService>,
    wallet: Option<Arc<WalletSession>>,
}

impl ConnectorContext {
    /// Build a context backed by the store selected in `config`.
    pub fn new(config: ConnectorConfig) -> ConnectorResult<Self> {
        let store = open_store(&config);
        Self::with_store(config, store)
    }

    /// Build a context on top of a host-provided store.
    pub fn with_store(config: ConnectorConfig, store: Arc<dyn KeyValueStore>) -> ConnectorResult<Self> {
        let tokens = provider_tokens(&config);
        let environment = Arc::new(EnvironmentStore::new(
            store,
            config.default_chain,
            config.default_network.clone(),
        ));
        let resolver = Arc::new(ProviderResolver::new(tokens.clone()));

        // Devnets run their own indexer; the host attaches it via `with_indexer`
        let tier = environment.get_network().tier().unwrap_or(NetworkTier::TestNet);
        let indexer_env = provider_env_for(ChainSymbol::Algo, tier, &tokens);
        let indexer: Arc<dyn IndexerService> = Arc::new(AlgoIndexerClient::from_provider_env(&indexer_env)?);
        tracing::info!(network = %tier, "Bound Algorand indexer client");

        let mut context = Self {
            manager: StdLibManager::new(environment.clone(), resolver.clone()),
            config,
            environment,
            resolver,
            registry: ConnectorRegistry::new(),
            indexer,
            wallet: None,
        };
        context.register_interfaces();
        Ok(context)
    }

    /// Replace the Algorand indexer backend.
    pub fn with_indexer(mut self, indexer: Arc<dyn IndexerService>) -> Self {
        self.indexer = indexer;
        self.register_interfaces();
        self
    }

    /// Enable WalletConnect sessions through `factory`.
    pub fn with_wallet_transport(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.wallet = Some(Arc::new(WalletSession::new(ChainSymbol::Algo, factory)));
        self.register_interfaces();
        self
    }

    /// Install the hook fired when a network switch or disconnect asks the
    /// host to reload. Loaded instances are kept.
    pub fn with_reload_hook(self, hook: ReloadHook) -> Self {
        self.environment.set_reload_hook(hook);
        self
    }

    fn register_interfaces(&mut self) {
        let mut algo = AlgoInterface::new(self.indexer.clone(), self.resolver.clone());
        if let Some(session) = &self.wallet {
            algo = algo.with_wallet_session(session.clone());
        }
        self.registry.register(Arc::new(algo));
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn environment(&self) -> &Arc<EnvironmentStore> {
        &self.environment
    }

    pub fn resolver(&self) -> &Arc<ProviderResolver> {
        &self.resolver
    }

    pub fn manager(&self) -> &StdLibManager {
        &self.manager
    }

    pub fn registry(&self) -> &ConnectorRegistry {
        &self.registry
    }

    pub fn wallet_session(&self) -> Option<&Arc<WalletSession>> {
        self.wallet.as_ref()
    }

    /// Persist `chain` and `network` (defaulting to the stored selection)
    /// and return that chain's network interface.
    ///
    /// BetaNet only exists on Algorand; other chains are switched to TestNet.
    pub fn connector_api(
        &self,
        chain: Option<ChainSymbol>,
        network: Option<NetworkProvider>,
    ) -> Arc<dyn NetworkInterface> {
        let chain = chain.unwrap_or_else(|| self.environment.get_chain());
        let network = match network.unwrap_or_else(|| self.environment.get_network()) {
            NetworkProvider::Tier(tier) => NetworkProvider::Tier(supported_tier(chain, tier)),
            devnet => devnet,
        };

        tracing::debug!(%chain, %network, "Creating connector API");
        self.environment.persist(&ChainSelection { chain, network });
        self.registry.get(chain)
    }

    /// Resolved environment for the stored selection. Empty on a devnet.
    pub fn provider_env(&self) -> ProviderEnv {
        let selection = self.environment.selection();
        self.resolver.resolve(selection.chain, &selection.network).env()
    }

    pub fn list_supported_networks(&self) -> Vec<NetworkData> {
        self.registry.list_supported_networks(self.environment.get_chain())
    }

    /// Hydrator bound to the default (or named) instance and its chain.
    pub fn hydrator(&self, instance_key: Option<&str>) -> ConnectorResult<Hydrator> {
        let stdlib = self.manager.get(instance_key)?;
        let connector = self.registry.get(stdlib.connector());
        Ok(Hydrator::new(stdlib, connector, self.environment.clone()))
    }

    /// Connect options honoring the configured asset limit.
    pub fn connect_opts(&self) -> ConnectOpts {
        ConnectOpts {
            initial_assets_limit: self.config.initial_assets_limit,
            ..ConnectOpts::default()
        }
    }

    /// Token descriptor and balance through the default (or named) instance.
    pub async fn token_metadata(
        &self,
        token_id: &str,
        account: Arc<dyn Account>,
        instance_key: Option<&str>,
    ) -> ConnectorResult<TokenMetadata> {
        let stdlib = self.manager.get(instance_key)?;
        let connector = self.registry.get(stdlib.connector());
        tokens::token_metadata(stdlib, connector, token_id, account, self.config.lookup_timeout).await
    }
}

fn provider_tokens(config: &ConnectorConfig) -> ProviderTokens {
    ProviderTokens {
        algod: config.algo_token.clone(),
        indexer: config.algo_indexer_token.clone(),
    }
}
