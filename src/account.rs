// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Connected-User Hydration
//!
//! Turns a bare SDK account into a [`ConnectedUserData`] record and manages
//! the reconnect hints kept in the host's key-value store.
//!
//! ## Stored hints
//!
//! | Key | Value |
//! |-----|-------|
//! | `user` | Address of the last web-wallet session |
//! | `walletconnect` | WalletConnect session JSON (`{"accounts": [...]}`) |
//!
//! Only addresses are ever persisted. A WalletConnect session keeps its own
//! bookkeeping, so the `user` hint is not written while one exists.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentStore;
use crate::error::ConnectorResult;
use crate::helpers::truncate_account_string;
use crate::models::{ConnectOpts, ConnectedUserData};
use crate::networks::NetworkInterface;
use crate::stdlib::{Account, StdLib};
use crate::tokens::format_currency;
use crate::wallet::WalletFallbackOpts;

/// Store key for the web-wallet reconnect address.
pub const USER_STORAGE_KEY: &str = "user";

/// Store key for the WalletConnect session record.
pub const WALLETCONNECT_STORAGE_KEY: &str = "walletconnect";

/// Balance reported when it was not fetched or the lookup failed.
const NEUTRAL_BALANCE: &str = "0";

/// Reconnect hints found in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub exists: bool,
    pub is_wc_session: bool,
    pub addr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WalletConnectHint {
    #[serde(default)]
    accounts: Vec<String>,
}

/// Builds user sessions for one SDK instance and its chain's connector.
pub struct Hydrator {
    stdlib: Arc<dyn StdLib>,
    connector: Arc<dyn NetworkInterface>,
    environment: Arc<EnvironmentStore>,
}

impl Hydrator {
    pub fn new(
        stdlib: Arc<dyn StdLib>,
        connector: Arc<dyn NetworkInterface>,
        environment: Arc<EnvironmentStore>,
    ) -> Self {
        Self {
            stdlib,
            connector,
            environment,
        }
    }

    /// Connect the SDK's default account and hydrate it.
    pub async fn connect(&self, opts: ConnectOpts) -> ConnectorResult<ConnectedUserData> {
        let account = self.stdlib.get_default_account().await?;
        Ok(self.hydrate(account, opts).await)
    }

    /// Reconnect to `saved`, or to the address found in the stored hints,
    /// falling back to the default account.
    pub async fn reconnect(
        &self,
        saved: Option<&str>,
        opts: ConnectOpts,
    ) -> ConnectorResult<ConnectedUserData> {
        let address = match saved.filter(|a| !a.is_empty()) {
            Some(address) => Some(address.to_string()),
            None => self.check_session_exists().addr,
        };

        let account = match address {
            Some(address) => {
                tracing::debug!(address = %truncate_account_string(&address, 6), "Reconnecting saved account");
                self.stdlib.connect_account(&address).await?
            }
            None => self.stdlib.get_default_account().await?,
        };
        Ok(self.hydrate(account, opts).await)
    }

    /// Fetch balance and assets concurrently and assemble the session record.
    ///
    /// A failed balance lookup yields `"0"`; a failed asset listing yields an
    /// empty listing. Neither cancels the other.
    pub async fn hydrate(&self, account: Arc<dyn Account>, opts: ConnectOpts) -> ConnectedUserData {
        let address = self.stdlib.format_address(account.as_ref());

        let balance = async {
            if !opts.fetch_balance {
                return NEUTRAL_BALANCE.to_string();
            }
            match self.stdlib.balance_of(account.as_ref(), None).await {
                Ok(atomic) => format_currency(self.stdlib.as_ref(), atomic, None, false),
                Err(e) => {
                    tracing::warn!(error = %e, "Balance lookup failed during hydration");
                    NEUTRAL_BALANCE.to_string()
                }
            }
        };
        let assets = async {
            if !opts.fetch_assets {
                return None;
            }
            Some(
                self.connector
                    .load_assets(&address, opts.initial_assets_limit)
                    .await,
            )
        };
        let (balance, assets) = tokio::join!(balance, assets);

        self.persist_user(&address);
        tracing::info!(
            chain = %self.stdlib.connector(),
            address = %truncate_account_string(&address, 6),
            "User session hydrated"
        );

        ConnectedUserData {
            account,
            address,
            balance,
            assets,
        }
    }

    /// Store `address` as the reconnect hint unless a WalletConnect session
    /// already tracks the user.
    fn persist_user(&self, address: &str) {
        let store = self.environment.store();
        if store.get_item(WALLETCONNECT_STORAGE_KEY).is_some() {
            return;
        }
        store.set_item(USER_STORAGE_KEY, address);
    }

    /// Inspect the stored hints. The `user` address wins over the
    /// WalletConnect account.
    pub fn check_session_exists(&self) -> SessionStatus {
        let store = self.environment.store();
        let wc = store.get_item(WALLETCONNECT_STORAGE_KEY);
        let user = store.get_item(USER_STORAGE_KEY).filter(|u| !u.is_empty());

        let wc_addr = wc.as_deref().and_then(|raw| {
            serde_json::from_str::<WalletConnectHint>(raw)
                .map_err(|e| tracing::debug!(error = %e, "Unreadable WalletConnect session hint"))
                .ok()
                .and_then(|hint| hint.accounts.into_iter().next())
        });

        SessionStatus {
            exists: user.is_some() || wc.is_some(),
            is_wc_session: wc.is_some(),
            addr: user.or(wc_addr),
        }
    }

    /// End the wallet session, clear both hints and reload the host.
    pub async fn disconnect_user(&self) -> ConnectorResult<()> {
        let result = self.connector.disconnect_user().await;

        let store = self.environment.store();
        store.remove_item(USER_STORAGE_KEY);
        store.remove_item(WALLETCONNECT_STORAGE_KEY);
        result?;

        tracing::info!(chain = %self.connector.chain(), "User disconnected");
        self.environment.request_reload();
        Ok(())
    }

    /// Fall back to the chain's web wallet.
    pub fn use_web_wallet(&self) -> ConnectorResult<()> {
        self.environment.store().remove_item(WALLETCONNECT_STORAGE_KEY);
        self.set_fallback(self.connector.web_wallet_opts(), "web-wallet")
    }

    /// Fall back to WalletConnect.
    pub fn use_wallet_connect(&self) -> ConnectorResult<()> {
        self.environment.store().remove_item(USER_STORAGE_KEY);
        self.set_fallback(self.connector.wallet_connect_opts(), "walletconnect")
    }

    fn set_fallback(&self, opts: Option<WalletFallbackOpts>, kind: &'static str) -> ConnectorResult<()> {
        let Some(opts) = opts else {
            tracing::warn!(chain = %self.connector.chain(), kind, "No wallet fallback available");
            return Ok(());
        };
        let network = self.environment.get_network();
        let mut env = self.connector.get_provider_env(&network);
        if env.is_empty() {
            // Devnets carry no resolver entry; the SDK knows its own endpoints
            env = self.stdlib.provider_env_by_name(&network);
        }
        let fallback = self.stdlib.wallet_fallback(opts.with_provider_env(env));
        self.stdlib.set_wallet_fallback(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::NETWORK_STORAGE_KEY;
    use crate::error::ConnectorError;
    use crate::models::{AccountInfo, AssetHolding, ChainSymbol, NetworkProvider, NetworkTier};
    use crate::networks::AlgoInterface;
    use crate::providers::ProviderResolver;
    use crate::store::{InMemoryStore, KeyValueStore};
    use crate::test_support::{
        sample_asset, MockIndexer, MockStdLib, MockTransport, MockTransportFactory,
    };
    use crate::wallet::{WalletProvider, WalletSession};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        store: Arc<InMemoryStore>,
        stdlib: Arc<MockStdLib>,
        indexer: Arc<MockIndexer>,
        reloads: Arc<AtomicUsize>,
        hydrator: Hydrator,
    }

    fn fixture(stdlib: MockStdLib) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let reloads = Arc::new(AtomicUsize::new(0));
        let counter = reloads.clone();
        let environment = Arc::new(
            EnvironmentStore::new(
                store.clone(),
                ChainSymbol::Algo,
                NetworkProvider::Tier(NetworkTier::TestNet),
            )
            .with_reload_hook(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );
        let indexer = Arc::new(MockIndexer::default());
        let stdlib = Arc::new(stdlib);
        let connector = Arc::new(AlgoInterface::new(
            indexer.clone(),
            Arc::new(ProviderResolver::default()),
        ));
        let hydrator = Hydrator::new(stdlib.clone(), connector, environment);
        Fixture {
            store,
            stdlib,
            indexer,
            reloads,
            hydrator,
        }
    }

    fn seed_account(indexer: &MockIndexer, address: &str) {
        indexer.set_account(AccountInfo {
            address: address.to_string(),
            amount: 0,
            assets: vec![AssetHolding {
                asset_id: 1,
                amount: 10,
            }],
            created_apps: vec![3],
        });
        indexer.add_asset(sample_asset(1));
    }

    #[tokio::test]
    async fn connect_without_assets() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo).with_balance(2_500_000));
        let user = f
            .hydrator
            .connect(ConnectOpts {
                fetch_assets: false,
                fetch_balance: true,
                ..ConnectOpts::default()
            })
            .await
            .unwrap();

        assert_eq!(user.address, MockStdLib::DEFAULT_ADDRESS);
        assert_eq!(user.account.address(), MockStdLib::DEFAULT_ADDRESS);
        assert_eq!(user.balance, "2.5");
        assert!(user.assets.is_none());
        assert_eq!(f.indexer.account_lookups(), 0);
    }

    #[tokio::test]
    async fn connect_loads_balance_and_assets() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo).with_balance(1_000_000));
        seed_account(&f.indexer, MockStdLib::DEFAULT_ADDRESS);

        let user = f.hydrator.connect(ConnectOpts::default()).await.unwrap();
        let assets = user.assets.unwrap();
        assert_eq!(user.balance, "1");
        assert_eq!(assets.apps_count.length, 1);
        assert_eq!(assets.assets[0].amount, 10);
        assert_eq!(
            f.store.get_item(USER_STORAGE_KEY).as_deref(),
            Some(MockStdLib::DEFAULT_ADDRESS)
        );
    }

    #[tokio::test]
    async fn failed_balance_does_not_cancel_assets() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo));
        seed_account(&f.indexer, MockStdLib::DEFAULT_ADDRESS);

        let user = f.hydrator.connect(ConnectOpts::default()).await.unwrap();
        assert_eq!(user.balance, "0");
        assert_eq!(user.assets.unwrap().assets.len(), 1);
    }

    #[tokio::test]
    async fn failed_assets_do_not_cancel_balance() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo).with_balance(3_000_000));
        let user = f.hydrator.connect(ConnectOpts::default()).await.unwrap();
        assert_eq!(user.balance, "3");
        assert_eq!(user.assets, Some(Default::default()));
    }

    #[tokio::test]
    async fn connect_failure_propagates() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo).without_default_account());
        assert!(matches!(
            f.hydrator.connect(ConnectOpts::default()).await,
            Err(ConnectorError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn walletconnect_session_skips_user_hint() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo).with_balance(1));
        f.store
            .set_item(WALLETCONNECT_STORAGE_KEY, r#"{"accounts":["WCADDR"]}"#);

        f.hydrator.connect(ConnectOpts::default()).await.unwrap();
        assert!(f.store.get_item(USER_STORAGE_KEY).is_none());
    }

    #[test]
    fn session_status_prefers_user_hint() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo));
        assert_eq!(f.hydrator.check_session_exists(), SessionStatus::default());

        f.store
            .set_item(WALLETCONNECT_STORAGE_KEY, r#"{"accounts":["WCADDR"]}"#);
        let status = f.hydrator.check_session_exists();
        assert!(status.exists && status.is_wc_session);
        assert_eq!(status.addr.as_deref(), Some("WCADDR"));

        f.store.set_item(USER_STORAGE_KEY, "WEBADDR");
        assert_eq!(f.hydrator.check_session_exists().addr.as_deref(), Some("WEBADDR"));

        f.store.set_item(WALLETCONNECT_STORAGE_KEY, "not json");
        f.store.remove_item(USER_STORAGE_KEY);
        let status = f.hydrator.check_session_exists();
        assert!(status.is_wc_session);
        assert_eq!(status.addr, None);
    }

    #[tokio::test]
    async fn reconnect_uses_saved_or_stored_address() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo).with_balance(1));
        let opts = ConnectOpts {
            fetch_assets: false,
            ..ConnectOpts::default()
        };

        let user = f.hydrator.reconnect(Some("SAVED"), opts).await.unwrap();
        assert_eq!(user.address, "SAVED");

        f.store.set_item(USER_STORAGE_KEY, "STORED");
        let user = f.hydrator.reconnect(None, opts).await.unwrap();
        assert_eq!(user.address, "STORED");

        f.store.remove_item(USER_STORAGE_KEY);
        let user = f.hydrator.reconnect(None, opts).await.unwrap();
        assert_eq!(user.address, MockStdLib::DEFAULT_ADDRESS);
    }

    #[tokio::test]
    async fn disconnect_clears_hints_and_reloads() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo));
        f.store.set_item(USER_STORAGE_KEY, "ADDR");
        f.store.set_item(WALLETCONNECT_STORAGE_KEY, "{}");

        f.hydrator.disconnect_user().await.unwrap();
        assert!(f.store.get_item(USER_STORAGE_KEY).is_none());
        assert!(f.store.get_item(WALLETCONNECT_STORAGE_KEY).is_none());
        assert_eq!(f.reloads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn web_wallet_fallback_clears_walletconnect_hint() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo));
        f.store.set_item(WALLETCONNECT_STORAGE_KEY, "{}");
        f.store.set_item(USER_STORAGE_KEY, "ADDR");

        f.hydrator.use_web_wallet().unwrap();
        assert!(f.store.get_item(WALLETCONNECT_STORAGE_KEY).is_none());
        assert!(f.store.get_item(USER_STORAGE_KEY).is_some());

        let calls = f.stdlib.calls();
        assert_eq!(calls.wallet_fallbacks.len(), 1);
        assert!(matches!(calls.wallet_fallbacks[0].provider, WalletProvider::WebWallet));
        assert_eq!(
            calls.wallet_fallbacks[0].provider_env.get("ALGO_INDEXER_SERVER"),
            Some("https://testnet-idx.algonode.cloud")
        );
    }

    #[test]
    fn devnet_fallback_takes_env_from_sdk() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo));
        f.store.set_item(NETWORK_STORAGE_KEY, "ALGO-devnet");

        f.hydrator.use_web_wallet().unwrap();

        let calls = f.stdlib.calls();
        assert_eq!(calls.wallet_fallbacks.len(), 1);
        assert_eq!(
            calls.wallet_fallbacks[0].provider_env.get("ALGO_SERVER"),
            Some("https://testnet-api.algonode.cloud")
        );
    }

    #[test]
    fn wallet_connect_fallback_requires_session() {
        let f = fixture(MockStdLib::new(ChainSymbol::Algo));
        f.store.set_item(USER_STORAGE_KEY, "ADDR");

        // Interface without a session: hint cleared, nothing installed
        f.hydrator.use_wallet_connect().unwrap();
        assert!(f.store.get_item(USER_STORAGE_KEY).is_none());
        assert!(f.stdlib.calls().wallet_fallbacks.is_empty());

        let transport = Arc::new(MockTransport::new(vec![]));
        let session = Arc::new(WalletSession::new(
            ChainSymbol::Algo,
            Arc::new(MockTransportFactory::new(transport)),
        ));
        let connector = Arc::new(
            AlgoInterface::new(f.indexer.clone(), Arc::new(ProviderResolver::default()))
                .with_wallet_session(session),
        );
        let environment = Arc::new(EnvironmentStore::new(
            f.store.clone(),
            ChainSymbol::Algo,
            NetworkProvider::Tier(NetworkTier::TestNet),
        ));
        let hydrator = Hydrator::new(f.stdlib.clone(), connector, environment);

        hydrator.use_wallet_connect().unwrap();
        let calls = f.stdlib.calls();
        assert!(matches!(
            calls.wallet_fallbacks[0].provider,
            WalletProvider::WalletConnect(_)
        ));
    }

    #[tokio::test]
    async fn other_chains_hydrate_without_assets() {
        let f = fixture(MockStdLib::new(ChainSymbol::Eth).with_balance(10u128.pow(18)));
        let hydrator = Hydrator::new(
            f.stdlib.clone(),
            Arc::new(crate::networks::UnimplementedInterface::new(ChainSymbol::Eth)),
            Arc::new(EnvironmentStore::new(
                f.store.clone(),
                ChainSymbol::Eth,
                NetworkProvider::Tier(NetworkTier::TestNet),
            )),
        );
        let user = hydrator.connect(ConnectOpts::default()).await.unwrap();
        assert_eq!(user.balance, "1");
        assert_eq!(user.assets, Some(Default::default()));
    }
}
