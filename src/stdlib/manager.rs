// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # SDK Instance Manager
//!
//! Owns the default SDK instance and a map of named instances.
//!
//! ## Slots
//!
//! Each slot moves `UNINITIALIZED -> READY` exactly once. Instances are never
//! torn down, only superseded by an explicit [`attach`](StdLibManager::attach).
//! Population happens under the slot write lock, so concurrent loads of the
//! default slot invoke the bootstrap function once.
//!
//! ## Unique instances
//!
//! A unique load bypasses the default slot. With an instance key the result
//! is tracked under that key (`"default"` names the default slot); without
//! one it is returned untracked. The first
//! unique load lifts the SDK's single-instance restriction, once per manager.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::{BootstrapArgs, StdLib, StdLibLoader};
use crate::environment::{is_devnet_provider, EnvironmentStore};
use crate::error::{ConnectorError, ConnectorResult};
use crate::models::{ChainSelection, ChainSymbol, NetworkProvider};
use crate::providers::{ProviderEnv, ProviderResolver};
use crate::wallet::WalletFallbackOpts;

/// Key naming the default slot.
pub const DEFAULT_INSTANCE_KEY: &str = "default";

/// Caller-supplied replacement for the derived provider environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOverride {
    /// Merged over the derived defaults.
    Env(ProviderEnv),
    /// Devnet provider string; switches to devnet bootstrap.
    Devnet(String),
}

/// Options for [`StdLibManager::load_with_options`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Defaults to the persisted chain.
    pub chain: Option<ChainSymbol>,
    /// Defaults to the persisted network.
    pub network: Option<NetworkProvider>,
    pub provider_env: Option<ProviderOverride>,
    pub show_contract_warnings: bool,
    pub unique_instance: bool,
    pub instance_key: Option<String>,
    pub wallet_fallback: Option<WalletFallbackOpts>,
}

#[derive(Default)]
struct Slots {
    default: Option<Arc<dyn StdLib>>,
    named: HashMap<String, Arc<dyn StdLib>>,
}

pub struct StdLibManager {
    environment: Arc<EnvironmentStore>,
    resolver: Arc<ProviderResolver>,
    slots: RwLock<Slots>,
    multi_instance: AtomicBool,
}

impl StdLibManager {
    pub fn new(environment: Arc<EnvironmentStore>, resolver: Arc<ProviderResolver>) -> Self {
        Self {
            environment,
            resolver,
            slots: RwLock::new(Slots::default()),
            multi_instance: AtomicBool::new(false),
        }
    }

    /// Load the default instance for `chain` and `network`, falling back to
    /// the persisted selection.
    ///
    /// Returns the cached default instance unless `unique` is set.
    pub fn load(
        &self,
        loader: &dyn StdLibLoader,
        chain: Option<ChainSymbol>,
        network: Option<NetworkProvider>,
        unique: bool,
    ) -> ConnectorResult<Arc<dyn StdLib>> {
        if !unique {
            if let Some(existing) = self.default_instance() {
                tracing::debug!("Reusing default SDK instance");
                return Ok(existing);
            }
        }
        self.check_multi_instance(loader, unique);

        let chain = chain.unwrap_or_else(|| self.environment.get_chain());
        let network = network.unwrap_or_else(|| self.environment.get_network());
        self.populate(unique, None, || self.bootstrap_by_name(loader, chain, &network))
    }

    /// Load an instance with an environment override and optional wallet
    /// fallback.
    pub fn load_with_options(
        &self,
        loader: &dyn StdLibLoader,
        opts: LoadOptions,
    ) -> ConnectorResult<Arc<dyn StdLib>> {
        let unique = opts.unique_instance;
        if !unique {
            if let Some(existing) = self.default_instance() {
                tracing::debug!("Reusing default SDK instance");
                return Ok(existing);
            }
        }
        self.check_multi_instance(loader, unique);

        let chain = opts.chain.unwrap_or_else(|| self.environment.get_chain());
        let network = match opts.network.clone() {
            Some(network) => network,
            None => self.environment.get_network(),
        };
        let key = opts.instance_key.as_deref();

        let devnet = match (&network, &opts.provider_env) {
            (NetworkProvider::Devnet(_), _) => Some(network.clone()),
            (_, Some(ProviderOverride::Devnet(raw))) if is_devnet_provider(raw) => {
                Some(NetworkProvider::Devnet(raw.clone()))
            }
            (_, Some(ProviderOverride::Devnet(raw))) => {
                return Err(ConnectorError::InvalidProvider(raw.clone()));
            }
            _ => None,
        };
        if let Some(devnet) = devnet {
            return self.populate(unique, key, || self.bootstrap_by_name(loader, chain, &devnet));
        }

        let overrides = match &opts.provider_env {
            Some(ProviderOverride::Env(env)) => Some(env),
            _ => None,
        };

        self.populate(unique, key, || {
            self.environment.persist(&ChainSelection {
                chain,
                network: network.clone(),
            });
            let env = self
                .resolver
                .resolve_with_override(chain, &network, overrides)
                .env();

            let instance = loader.load(BootstrapArgs::Connector {
                connector_mode: chain,
                no_warn: !opts.show_contract_warnings,
            })?;

            match &opts.wallet_fallback {
                Some(fallback) => {
                    let fallback = instance.wallet_fallback(fallback.clone().with_provider_env(env));
                    instance.set_wallet_fallback(fallback)?;
                }
                None if !env.is_empty() => instance.set_provider_by_env(&env)?,
                None => {}
            }

            tracing::info!(%chain, %network, unique, instance_key = ?key, "Loaded SDK instance");
            Ok(instance)
        })
    }

    /// Return the default instance, or the named instance for `key`.
    pub fn get(&self, key: Option<&str>) -> ConnectorResult<Arc<dyn StdLib>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        match key.filter(|k| *k != DEFAULT_INSTANCE_KEY) {
            None => slots
                .default
                .clone()
                .ok_or(ConnectorError::Uninstantiated { key: None }),
            Some(key) => slots
                .named
                .get(key)
                .cloned()
                .ok_or_else(|| ConnectorError::Uninstantiated {
                    key: Some(key.to_string()),
                }),
        }
    }

    /// Register an externally constructed instance, replacing whatever the
    /// slot held.
    pub fn attach(&self, instance: Arc<dyn StdLib>, key: Option<&str>) -> Arc<dyn StdLib> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        match key.filter(|k| *k != DEFAULT_INSTANCE_KEY) {
            None => slots.default = Some(instance.clone()),
            Some(key) => {
                slots.named.insert(key.to_string(), instance.clone());
            }
        }
        tracing::info!(chain = %instance.connector(), instance_key = ?key, "Attached SDK instance");
        instance
    }

    pub fn is_multi_instance_enabled(&self) -> bool {
        self.multi_instance.load(Ordering::SeqCst)
    }

    fn default_instance(&self) -> Option<Arc<dyn StdLib>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .default
            .clone()
    }

    /// One-way switch into multi-instance mode.
    fn check_multi_instance(&self, loader: &dyn StdLibLoader, unique: bool) {
        if unique && !self.multi_instance.swap(true, Ordering::SeqCst) {
            tracing::info!("Enabling multiple SDK instances");
            loader.allow_multiple_instances();
        }
    }

    /// Store the result of `build` according to the slot rules.
    ///
    /// The default slot is checked again under the write lock, so a racing
    /// load returns the winner's instance without bootstrapping.
    fn populate<F>(&self, unique: bool, key: Option<&str>, build: F) -> ConnectorResult<Arc<dyn StdLib>>
    where
        F: FnOnce() -> ConnectorResult<Arc<dyn StdLib>>,
    {
        if unique {
            let instance = build()?;
            let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
            match key {
                Some(DEFAULT_INSTANCE_KEY) => slots.default = Some(instance.clone()),
                Some(key) => {
                    slots.named.insert(key.to_string(), instance.clone());
                }
                None => {}
            }
            return Ok(instance);
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = slots.default.as_ref() {
            return Ok(existing.clone());
        }
        let instance = build()?;
        slots.default = Some(instance.clone());
        Ok(instance)
    }

    /// Persist the selection and bootstrap by chain or devnet provider.
    fn bootstrap_by_name(
        &self,
        loader: &dyn StdLibLoader,
        chain: ChainSymbol,
        network: &NetworkProvider,
    ) -> ConnectorResult<Arc<dyn StdLib>> {
        self.environment.persist(&ChainSelection {
            chain,
            network: network.clone(),
        });
        self.resolver.resolve(chain, network);

        let instance = match network {
            NetworkProvider::Devnet(raw) => loader.load(BootstrapArgs::Devnet(raw.clone()))?,
            NetworkProvider::Tier(_) => {
                let instance = loader.load(BootstrapArgs::connector(chain))?;
                // Algorand picks its network in a second step.
                if chain.is_algorand_like() {
                    instance.set_provider_by_name(network)?;
                }
                instance
            }
        };

        tracing::info!(%chain, %network, "Loaded SDK instance");
        Ok(instance)
    }
}
