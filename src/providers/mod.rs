// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Provider Environment Resolution
//!
//! Turns a `(chain, network)` pair into the connection parameters the SDK
//! needs. Devnet provider strings short-circuit resolution: the raw string
//! becomes the sole bootstrap argument instead of a parameter map.
//!
//! The resolver memoizes the last resolved pair; any change of chain or
//! network recomputes.

pub mod defaults;

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

pub use defaults::{provider_env_for, supported_tier, ProviderTokens};

use crate::models::{ChainSymbol, NetworkProvider};

/// Named connection parameters for one chain and tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderEnv(BTreeMap<String, String>);

impl ProviderEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay `overrides` on top of `self`; override values win.
    pub fn merged_with(mut self, overrides: &ProviderEnv) -> Self {
        for (k, v) in overrides.iter() {
            self.insert(k, v);
        }
        self
    }
}

/// Outcome of resolving a network selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderResolution {
    /// Structured parameters for a regular tier.
    Env(ProviderEnv),
    /// Devnet provider string, passed to bootstrap as-is.
    Devnet(String),
}

impl ProviderResolution {
    /// The parameter map, or an empty one for devnet providers.
    pub fn env(&self) -> ProviderEnv {
        match self {
            ProviderResolution::Env(env) => env.clone(),
            ProviderResolution::Devnet(_) => ProviderEnv::new(),
        }
    }
}

#[derive(Debug)]
struct LastResolved {
    chain: ChainSymbol,
    network: NetworkProvider,
    env: ProviderEnv,
}

/// Resolves provider environments with a single-entry memo.
#[derive(Debug)]
pub struct ProviderResolver {
    tokens: ProviderTokens,
    last: Mutex<Option<LastResolved>>,
}

impl ProviderResolver {
    pub fn new(tokens: ProviderTokens) -> Self {
        Self {
            tokens,
            last: Mutex::new(None),
        }
    }

    /// Resolve the environment for `chain` on `network`.
    pub fn resolve(&self, chain: ChainSymbol, network: &NetworkProvider) -> ProviderResolution {
        let tier = match network {
            NetworkProvider::Devnet(raw) => return ProviderResolution::Devnet(raw.clone()),
            NetworkProvider::Tier(tier) => *tier,
        };

        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = last.as_ref() {
            if cached.chain == chain && &cached.network == network {
                tracing::debug!(%chain, %network, "Provider environment cache hit");
                return ProviderResolution::Env(cached.env.clone());
            }
        }

        let env = provider_env_for(chain, tier, &self.tokens);
        *last = Some(LastResolved {
            chain,
            network: network.clone(),
            env: env.clone(),
        });
        ProviderResolution::Env(env)
    }

    /// Resolve, then merge a caller-supplied override on top.
    pub fn resolve_with_override(
        &self,
        chain: ChainSymbol,
        network: &NetworkProvider,
        overrides: Option<&ProviderEnv>,
    ) -> ProviderResolution {
        match (self.resolve(chain, network), overrides) {
            (ProviderResolution::Env(env), Some(overrides)) => {
                ProviderResolution::Env(env.merged_with(overrides))
            }
            (resolution, _) => resolution,
        }
    }

    /// True when the memo holds exactly this pair.
    pub fn is_cached(&self, chain: ChainSymbol, network: &NetworkProvider) -> bool {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|c| c.chain == chain && &c.network == network)
    }
}

impl Default for ProviderResolver {
    fn default() -> Self {
        Self::new(ProviderTokens::default())
    }
}
