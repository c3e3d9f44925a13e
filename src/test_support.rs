// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process doubles for the SDK, indexer and wallet transport.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ConnectorError, ConnectorResult, QueryError, QueryResult};
use crate::models::{AccountInfo, AssetRecord, ChainSymbol, NetworkProvider, NetworkTier, TxnPage, TxnSearchOpts};
use crate::networks::IndexerService;
use crate::providers::{provider_env_for, ProviderEnv, ProviderTokens};
use crate::stdlib::{Account, BootstrapArgs, StdLib, StdLibLoader, WalletFallback};
use crate::wallet::{CustomRequest, EventHandler, TransportEvent, TransportFactory, WalletFallbackOpts, WalletTransport};

// =============================================================================
// Amount formatting
// =============================================================================

pub(crate) fn format_units(amount: u128, decimals: u32) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let divisor = 10u128.pow(decimals);
    let fraction = format!("{:0width$}", amount % divisor, width = decimals as usize);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        (amount / divisor).to_string()
    } else {
        format!("{}.{fraction}", amount / divisor)
    }
}

pub(crate) fn parse_units(amount: &str, decimals: u32) -> ConnectorResult<u128> {
    let invalid = || ConnectorError::Transport(format!("invalid amount: {amount}"));
    let (whole, fraction) = amount.trim().split_once('.').unwrap_or((amount.trim(), ""));
    let mut fraction = fraction.to_string();
    fraction.truncate(decimals as usize);
    let fraction = format!("{fraction:0<width$}", width = decimals as usize);

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let fraction: u128 = if fraction.is_empty() { 0 } else { fraction.parse().map_err(|_| invalid())? };
    Ok(whole * 10u128.pow(decimals) + fraction)
}

pub(crate) fn sample_asset(id: u64) -> AssetRecord {
    AssetRecord {
        id,
        amount: 0,
        decimals: 6,
        name: format!("Token {id}"),
        symbol: format!("TK{id}"),
        supply: 1_000_000,
        url: None,
    }
}

// =============================================================================
// SDK
// =============================================================================

pub(crate) struct MockAccount {
    address: String,
    metadata: Option<Value>,
    accepted: Mutex<Vec<String>>,
    fail_opt_in: bool,
    accept_calls: AtomicUsize,
}

impl MockAccount {
    pub(crate) fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            metadata: None,
            accepted: Mutex::new(Vec::new()),
            fail_opt_in: false,
            accept_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub(crate) fn with_accepted(self, token_id: &str) -> Self {
        self.accepted.lock().unwrap().push(token_id.to_string());
        self
    }

    /// Opt-in lookups and opt-in requests both fail.
    pub(crate) fn failing_opt_in(mut self) -> Self {
        self.fail_opt_in = true;
        self
    }

    pub(crate) fn accept_calls(&self) -> usize {
        self.accept_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Account for MockAccount {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn token_metadata(&self, _token_id: &str) -> ConnectorResult<Option<Value>> {
        Ok(self.metadata.clone())
    }

    async fn token_accepted(&self, token_id: &str) -> ConnectorResult<bool> {
        if self.fail_opt_in {
            return Err(ConnectorError::Account("account lookup failed".into()));
        }
        Ok(self.accepted.lock().unwrap().iter().any(|t| t == token_id))
    }

    async fn token_accept(&self, token_id: &str) -> ConnectorResult<()> {
        self.accept_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_opt_in {
            return Err(ConnectorError::Account("opt-in rejected".into()));
        }
        self.accepted.lock().unwrap().push(token_id.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StdLibCalls {
    pub(crate) provider_by_name: Vec<NetworkProvider>,
    pub(crate) provider_by_env: Vec<ProviderEnv>,
    pub(crate) wallet_fallbacks: Vec<WalletFallback>,
}

pub(crate) struct MockStdLib {
    connector: ChainSymbol,
    balance: Option<u128>,
    has_default_account: bool,
    calls: Mutex<StdLibCalls>,
}

impl MockStdLib {
    pub(crate) const DEFAULT_ADDRESS: &'static str = "DEFAULTADDR";

    pub(crate) fn new(connector: ChainSymbol) -> Self {
        Self {
            connector,
            balance: None,
            has_default_account: true,
            calls: Mutex::new(StdLibCalls::default()),
        }
    }

    pub(crate) fn with_balance(mut self, balance: u128) -> Self {
        self.balance = Some(balance);
        self
    }

    pub(crate) fn without_default_account(mut self) -> Self {
        self.has_default_account = false;
        self
    }

    pub(crate) fn calls(&self) -> StdLibCalls {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StdLib for MockStdLib {
    fn connector(&self) -> ChainSymbol {
        self.connector
    }

    async fn balance_of(&self, _account: &dyn Account, _token: Option<&str>) -> ConnectorResult<u128> {
        self.balance
            .ok_or_else(|| ConnectorError::Transport("balance unavailable".to_string()))
    }

    fn format_address(&self, account: &dyn Account) -> String {
        account.address()
    }

    fn format_with_decimals(&self, atomic_units: u128, decimals: u32) -> String {
        format_units(atomic_units, decimals)
    }

    fn parse_currency(&self, amount: &str, decimals: u32) -> ConnectorResult<u128> {
        parse_units(amount, decimals)
    }

    async fn get_default_account(&self) -> ConnectorResult<Arc<dyn Account>> {
        if !self.has_default_account {
            return Err(ConnectorError::Transport("no wallet available".to_string()));
        }
        Ok(Arc::new(MockAccount::new(Self::DEFAULT_ADDRESS)))
    }

    async fn connect_account(&self, address: &str) -> ConnectorResult<Arc<dyn Account>> {
        Ok(Arc::new(MockAccount::new(address)))
    }

    fn set_provider_by_name(&self, network: &NetworkProvider) -> ConnectorResult<()> {
        self.calls.lock().unwrap().provider_by_name.push(network.clone());
        Ok(())
    }

    fn set_provider_by_env(&self, env: &ProviderEnv) -> ConnectorResult<()> {
        self.calls.lock().unwrap().provider_by_env.push(env.clone());
        Ok(())
    }

    fn wallet_fallback(&self, opts: WalletFallbackOpts) -> WalletFallback {
        WalletFallback {
            provider: opts.provider,
            provider_env: opts.provider_env.unwrap_or_default(),
        }
    }

    fn set_wallet_fallback(&self, fallback: WalletFallback) -> ConnectorResult<()> {
        self.calls.lock().unwrap().wallet_fallbacks.push(fallback);
        Ok(())
    }

    fn provider_env_by_name(&self, network: &NetworkProvider) -> ProviderEnv {
        let tier = network.tier().unwrap_or(NetworkTier::TestNet);
        provider_env_for(self.connector, tier, &ProviderTokens::default())
    }
}

/// Bootstrap double that records its arguments and keeps every instance.
#[derive(Default)]
pub(crate) struct MockLoader {
    fail: bool,
    args: Mutex<Vec<BootstrapArgs>>,
    instances: Mutex<Vec<Arc<MockStdLib>>>,
    allow_calls: AtomicUsize,
}

impl MockLoader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn args(&self) -> Vec<BootstrapArgs> {
        self.args.lock().unwrap().clone()
    }

    pub(crate) fn load_count(&self) -> usize {
        self.args.lock().unwrap().len()
    }

    pub(crate) fn allow_calls(&self) -> usize {
        self.allow_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_instance(&self) -> Option<Arc<MockStdLib>> {
        self.instances.lock().unwrap().last().cloned()
    }
}

impl StdLibLoader for MockLoader {
    fn load(&self, args: BootstrapArgs) -> ConnectorResult<Arc<dyn StdLib>> {
        self.args.lock().unwrap().push(args.clone());
        if self.fail {
            return Err(ConnectorError::Bootstrap(format!("cannot load {args}")));
        }

        let chain = match &args {
            BootstrapArgs::Connector { connector_mode, .. } => *connector_mode,
            BootstrapArgs::Devnet(raw) => raw
                .split('-')
                .next()
                .and_then(|prefix| prefix.parse().ok())
                .unwrap_or(ChainSymbol::Algo),
        };
        let instance = Arc::new(MockStdLib::new(chain));
        self.instances.lock().unwrap().push(instance.clone());
        Ok(instance)
    }

    fn allow_multiple_instances(&self) {
        self.allow_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Indexer
// =============================================================================

#[derive(Default)]
pub(crate) struct MockIndexer {
    fail: bool,
    account: Mutex<Option<AccountInfo>>,
    assets: Mutex<HashMap<u64, AssetRecord>>,
    account_lookups: AtomicUsize,
    asset_lookups: AtomicUsize,
}

impl MockIndexer {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn set_account(&self, account: AccountInfo) {
        *self.account.lock().unwrap() = Some(account);
    }

    pub(crate) fn add_asset(&self, asset: AssetRecord) {
        self.assets.lock().unwrap().insert(asset.id, asset);
    }

    pub(crate) fn account_lookups(&self) -> usize {
        self.account_lookups.load(Ordering::SeqCst)
    }

    pub(crate) fn asset_lookups(&self) -> usize {
        self.asset_lookups.load(Ordering::SeqCst)
    }

    fn check(&self) -> QueryResult<()> {
        if self.fail {
            return Err(QueryError::Decode("indexer unavailable".to_string()));
        }
        Ok(())
    }
}

fn not_found() -> QueryError {
    QueryError::Status {
        status: 404,
        body: "not found".to_string(),
    }
}

#[async_trait]
impl IndexerService for MockIndexer {
    async fn lookup_account(&self, _address: &str) -> QueryResult<AccountInfo> {
        self.account_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.account.lock().unwrap().clone().ok_or_else(not_found)
    }

    async fn lookup_asset(&self, asset_id: u64) -> QueryResult<AssetRecord> {
        self.asset_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.assets
            .lock()
            .unwrap()
            .get(&asset_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn search_assets(&self, name: &str) -> QueryResult<Vec<AssetRecord>> {
        self.check()?;
        Ok(self
            .assets
            .lock()
            .unwrap()
            .values()
            .filter(|asset| asset.name.contains(name))
            .cloned()
            .collect())
    }

    async fn search_transactions(&self, _address: &str, _opts: &TxnSearchOpts) -> QueryResult<TxnPage> {
        self.check()?;
        Ok(TxnPage::default())
    }
}

// =============================================================================
// Wallet transport
// =============================================================================

pub(crate) struct MockTransport {
    connected: AtomicBool,
    accounts: Vec<String>,
    handlers: Mutex<Vec<(TransportEvent, EventHandler)>>,
    sign_response: Mutex<Result<Value, String>>,
    requests: Mutex<Vec<CustomRequest>>,
    create_calls: AtomicUsize,
    kill_calls: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn new(accounts: Vec<String>) -> Self {
        Self {
            connected: AtomicBool::new(false),
            accounts,
            handlers: Mutex::new(Vec::new()),
            sign_response: Mutex::new(Ok(Value::Array(Vec::new()))),
            requests: Mutex::new(Vec::new()),
            create_calls: AtomicUsize::new(0),
            kill_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub(crate) fn set_sign_response(&self, response: Result<Value, String>) {
        *self.sign_response.lock().unwrap() = response;
    }

    /// Deliver `event` to every handler registered for it.
    pub(crate) fn emit(
        &self,
        event: TransportEvent,
        payload: Result<Value, String>,
    ) -> Vec<ConnectorResult<()>> {
        if payload.is_ok() && event == TransportEvent::Connect {
            self.set_connected(true);
        }
        let handlers: Vec<EventHandler> = self
            .handlers
            .lock()
            .unwrap()
            .iter()
            .filter(|(registered, _)| *registered == event)
            .map(|(_, handler)| handler.clone())
            .collect();
        handlers.iter().map(|handler| handler(payload.clone())).collect()
    }

    pub(crate) fn handler_count(&self, event: TransportEvent) -> usize {
        self.handlers
            .lock()
            .unwrap()
            .iter()
            .filter(|(registered, _)| *registered == event)
            .count()
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn kill_calls(&self) -> usize {
        self.kill_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<CustomRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl WalletTransport for MockTransport {
    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn accounts(&self) -> Vec<String> {
        self.accounts.clone()
    }

    async fn create_session(&self) -> ConnectorResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn kill_session(&self) -> ConnectorResult<()> {
        self.kill_calls.fetch_add(1, Ordering::SeqCst);
        self.set_connected(false);
        Ok(())
    }

    async fn send_custom_request(&self, request: CustomRequest) -> ConnectorResult<Value> {
        self.requests.lock().unwrap().push(request);
        self.sign_response
            .lock()
            .unwrap()
            .clone()
            .map_err(ConnectorError::Signing)
    }

    fn on(&self, event: TransportEvent, handler: EventHandler) {
        self.handlers.lock().unwrap().push((event, handler));
    }
}

/// Hands out the same transport on every call, counting constructions.
pub(crate) struct MockTransportFactory {
    transport: Arc<MockTransport>,
    created: AtomicUsize,
}

impl MockTransportFactory {
    pub(crate) fn new(transport: Arc<MockTransport>) -> Self {
        Self {
            transport,
            created: AtomicUsize::new(0),
        }
    }

    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl TransportFactory for MockTransportFactory {
    fn create(&self) -> ConnectorResult<Arc<dyn WalletTransport>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(self.transport.clone())
    }
}
