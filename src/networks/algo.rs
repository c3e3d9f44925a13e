// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Algorand network interface.
//!
//! The `try_*` methods expose the underlying [`QueryResult`] so callers can
//! tell an empty account from a failed lookup; the [`NetworkInterface`]
//! methods log the failure and return the neutral value.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use super::indexer::IndexerService;
use super::NetworkInterface;
use crate::error::{ConnectorResult, QueryResult};
use crate::models::{
    AccountInfo, AppsCount, AssetListing, AssetRecord, ChainSymbol, NetworkProvider, TxnPage,
    TxnSearchOpts,
};
use crate::providers::{ProviderEnv, ProviderResolver};
use crate::storage::AssetCache;
use crate::wallet::{WalletFallbackOpts, WalletProvider, WalletSession};

pub struct AlgoInterface {
    indexer: Arc<dyn IndexerService>,
    resolver: Arc<ProviderResolver>,
    assets: AssetCache,
    wallet: Option<Arc<WalletSession>>,
}

impl AlgoInterface {
    pub fn new(indexer: Arc<dyn IndexerService>, resolver: Arc<ProviderResolver>) -> Self {
        Self {
            indexer,
            resolver,
            assets: AssetCache::default(),
            wallet: None,
        }
    }

    /// Attach the WalletConnect session used for wallet fallbacks.
    pub fn with_wallet_session(mut self, session: Arc<WalletSession>) -> Self {
        self.wallet = Some(session);
        self
    }

    pub fn with_asset_cache(mut self, cache: AssetCache) -> Self {
        self.assets = cache;
        self
    }

    pub fn wallet_session(&self) -> Option<&Arc<WalletSession>> {
        self.wallet.as_ref()
    }

    pub async fn try_fetch_account(&self, address: &str) -> QueryResult<AccountInfo> {
        self.indexer.lookup_account(address).await
    }

    pub async fn try_fetch_asset_by_id(&self, asset_id: u64, amount: u64) -> QueryResult<AssetRecord> {
        let asset = match self.assets.get(asset_id) {
            Some(cached) => {
                tracing::debug!(asset_id, "Asset metadata cache hit");
                cached
            }
            None => {
                let fetched = self.indexer.lookup_asset(asset_id).await?;
                self.assets.put(fetched.clone());
                fetched
            }
        };
        Ok(AssetRecord { amount, ..asset })
    }

    /// Apps count plus metadata for the first `limit` holdings. Holdings
    /// whose metadata lookup fails are left out.
    pub async fn try_load_assets(&self, address: &str, limit: usize) -> QueryResult<AssetListing> {
        let account = self.try_fetch_account(address).await?;
        let lookups = account
            .assets
            .iter()
            .take(limit)
            .map(|holding| self.fetch_asset_by_id(holding.asset_id, holding.amount));

        let assets = join_all(lookups).await.into_iter().flatten().collect();
        Ok(AssetListing {
            apps_count: AppsCount::new(account.created_apps.len()),
            assets,
        })
    }

    pub async fn try_search_assets_by_name(&self, name: &str) -> QueryResult<Vec<AssetRecord>> {
        self.indexer.search_assets(name).await
    }

    pub async fn try_search_for_transactions(
        &self,
        address: &str,
        opts: &TxnSearchOpts,
    ) -> QueryResult<TxnPage> {
        self.indexer.search_transactions(address, opts).await
    }
}

#[async_trait]
impl NetworkInterface for AlgoInterface {
    fn chain(&self) -> ChainSymbol {
        ChainSymbol::Algo
    }

    async fn fetch_account(&self, address: &str) -> Option<AccountInfo> {
        match self.try_fetch_account(address).await {
            Ok(account) => Some(account),
            Err(e) => {
                tracing::warn!(address, error = %e, "Account lookup failed");
                None
            }
        }
    }

    async fn fetch_asset_by_id(&self, asset_id: u64, amount: u64) -> Option<AssetRecord> {
        match self.try_fetch_asset_by_id(asset_id, amount).await {
            Ok(asset) => Some(asset),
            Err(e) => {
                tracing::warn!(asset_id, error = %e, "Asset lookup failed");
                None
            }
        }
    }

    async fn load_assets(&self, address: &str, limit: usize) -> AssetListing {
        self.try_load_assets(address, limit).await.unwrap_or_else(|e| {
            tracing::warn!(address, error = %e, "Asset listing failed");
            AssetListing::default()
        })
    }

    async fn search_assets_by_name(&self, name: &str) -> Vec<AssetRecord> {
        self.try_search_assets_by_name(name).await.unwrap_or_else(|e| {
            tracing::warn!(name, error = %e, "Asset search failed");
            Vec::new()
        })
    }

    async fn search_for_transactions(&self, address: &str, opts: &TxnSearchOpts) -> TxnPage {
        self.try_search_for_transactions(address, opts)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(address, error = %e, "Transaction search failed");
                TxnPage::default()
            })
    }

    fn get_provider_env(&self, network: &NetworkProvider) -> ProviderEnv {
        self.resolver.resolve(ChainSymbol::Algo, network).env()
    }

    fn wallet_connect_opts(&self) -> Option<WalletFallbackOpts> {
        let session = self.wallet.clone()?;
        Some(WalletFallbackOpts::new(WalletProvider::WalletConnect(session)))
    }

    fn web_wallet_opts(&self) -> Option<WalletFallbackOpts> {
        Some(WalletFallbackOpts::new(WalletProvider::WebWallet))
    }

    async fn disconnect_user(&self) -> ConnectorResult<()> {
        match &self.wallet {
            Some(session) => session.disconnect().await,
            None => Ok(()),
        }
    }
}
