// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Algorand Indexer Client
//!
//! Thin REST client for the Algorand indexer v2 API. Every call returns a
//! [`QueryResult`]; callers decide how a failure degrades.
//!
//! ## Endpoints
//!
//! | Call | Endpoint |
//! |------|----------|
//! | account lookup | `GET /v2/accounts/{address}` |
//! | asset lookup | `GET /v2/assets/{id}` |
//! | asset search | `GET /v2/assets?name=` |
//! | transaction search | `GET /v2/transactions?address=` |

use std::time::Duration;

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::{QueryError, QueryResult};
use crate::helpers::trim_byte_string;
use crate::models::{AccountInfo, AssetHolding, AssetRecord, TxnPage, TxnSearchOpts};
use crate::providers::defaults::{ALGO_INDEXER_PORT, ALGO_INDEXER_SERVER, ALGO_INDEXER_TOKEN};
use crate::providers::ProviderEnv;

/// Header carrying the indexer API token.
const TOKEN_HEADER: &str = "X-Indexer-API-Token";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

static EMPTY: Value = Value::Null;

/// Account, asset and transaction queries against a chain indexer.
#[async_trait]
pub trait IndexerService: Send + Sync {
    async fn lookup_account(&self, address: &str) -> QueryResult<AccountInfo>;

    async fn lookup_asset(&self, asset_id: u64) -> QueryResult<AssetRecord>;

    async fn search_assets(&self, name: &str) -> QueryResult<Vec<AssetRecord>>;

    async fn search_transactions(&self, address: &str, opts: &TxnSearchOpts) -> QueryResult<TxnPage>;
}

pub struct AlgoIndexerClient {
    base_url: Url,
    token: String,
    http: Client,
}

impl AlgoIndexerClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> QueryResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| QueryError::InvalidUrl(format!("{base_url}: {e}")))?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            base_url,
            token: token.into(),
            http,
        })
    }

    /// Build a client from the `ALGO_INDEXER_*` entries of a provider
    /// environment.
    pub fn from_provider_env(env: &ProviderEnv) -> QueryResult<Self> {
        let server = env
            .get(ALGO_INDEXER_SERVER)
            .ok_or_else(|| QueryError::InvalidUrl(format!("{ALGO_INDEXER_SERVER} is not set")))?;
        let mut client = Self::new(server, env.get(ALGO_INDEXER_TOKEN).unwrap_or_default())?;

        if let Some(port) = env.get(ALGO_INDEXER_PORT).and_then(|p| p.parse::<u16>().ok()) {
            if client.base_url.port_or_known_default() != Some(port) {
                client
                    .base_url
                    .set_port(Some(port))
                    .map_err(|_| QueryError::InvalidUrl(format!("{server}: cannot set port {port}")))?;
            }
        }
        Ok(client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> QueryResult<Value> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| QueryError::InvalidUrl(format!("{path}: {e}")))?;

        let mut request = self.http.get(url).query(query);
        if !self.token.is_empty() {
            request = request.header(TOKEN_HEADER, &self.token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| QueryError::Decode(format!("GET {path}: {e}")))
    }
}

#[async_trait]
impl IndexerService for AlgoIndexerClient {
    async fn lookup_account(&self, address: &str) -> QueryResult<AccountInfo> {
        let body = self.get_json(&format!("v2/accounts/{address}"), &[]).await?;
        parse_account(address, &body)
    }

    async fn lookup_asset(&self, asset_id: u64) -> QueryResult<AssetRecord> {
        let body = self.get_json(&format!("v2/assets/{asset_id}"), &[]).await?;
        let asset = body
            .get("asset")
            .ok_or_else(|| QueryError::Decode(format!("asset {asset_id}: missing `asset`")))?;
        parse_asset(asset)
    }

    async fn search_assets(&self, name: &str) -> QueryResult<Vec<AssetRecord>> {
        let body = self
            .get_json("v2/assets", &[("name", name.to_string())])
            .await?;
        Ok(parse_asset_list(&body))
    }

    async fn search_transactions(&self, address: &str, opts: &TxnSearchOpts) -> QueryResult<TxnPage> {
        tracing::debug!(address, note = ?opts.note, "Searching indexer transactions");
        let body = self
            .get_json("v2/transactions", &transaction_query(address, opts))
            .await?;
        Ok(parse_txn_page(&body))
    }
}

// =============================================================================
// Query building and response parsing
// =============================================================================

/// Query parameters for a transaction search.
///
/// Zero amounts and rounds are treated as unset. An exact amount becomes an
/// open window one unit wide on either side.
pub(crate) fn transaction_query(address: &str, opts: &TxnSearchOpts) -> Vec<(&'static str, String)> {
    let mut query = vec![("address", address.to_string())];

    if let Some(note) = opts.note.as_deref().filter(|n| !n.is_empty()) {
        query.push(("note-prefix", Base64::encode_string(note.as_bytes())));
    }
    if let Some(amount) = opts.amount.filter(|a| *a > 0) {
        query.push(("currency-greater-than", (amount - 1).to_string()));
        query.push(("currency-less-than", amount.saturating_add(1).to_string()));
    }
    if let Some(round) = opts.min_round.filter(|r| *r > 0) {
        query.push(("min-round", round.to_string()));
    }
    if let Some(after) = opts.after {
        query.push(("after-time", after.to_rfc3339_opts(SecondsFormat::Secs, true)));
    }
    if let Some(before) = opts.before {
        query.push(("before-time", before.to_rfc3339_opts(SecondsFormat::Secs, true)));
    }
    query
}

fn field_u64(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

pub(crate) fn parse_account(address: &str, body: &Value) -> QueryResult<AccountInfo> {
    let account = body
        .get("account")
        .ok_or_else(|| QueryError::Decode(format!("account {address}: missing `account`")))?;

    let assets = account
        .get("assets")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|holding| {
                    Some(AssetHolding {
                        asset_id: holding.get("asset-id")?.as_u64()?,
                        amount: field_u64(holding, "amount"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let created_apps = account
        .get("created-apps")
        .and_then(Value::as_array)
        .map(|apps| {
            apps.iter()
                .filter_map(|app| app.get("id").and_then(Value::as_u64))
                .collect()
        })
        .unwrap_or_default();

    Ok(AccountInfo {
        address: account
            .get("address")
            .and_then(Value::as_str)
            .unwrap_or(address)
            .to_string(),
        amount: field_u64(account, "amount"),
        assets,
        created_apps,
    })
}

/// Normalize an indexer asset object. Names fall back to `Asset #<id>` and
/// symbols to `#<id>`.
pub(crate) fn parse_asset(asset: &Value) -> QueryResult<AssetRecord> {
    let id = asset
        .get("index")
        .and_then(Value::as_u64)
        .ok_or_else(|| QueryError::Decode("asset without `index`".to_string()))?;
    let params = asset.get("params").unwrap_or(&EMPTY);

    Ok(AssetRecord {
        id,
        amount: 0,
        decimals: params
            .get("decimals")
            .and_then(Value::as_u64)
            .and_then(|d| u32::try_from(d).ok())
            .unwrap_or(0),
        name: text_param(params, "name", "name-b64").unwrap_or_else(|| format!("Asset #{id}")),
        symbol: text_param(params, "unit-name", "unit-name-b64").unwrap_or_else(|| format!("#{id}")),
        supply: field_u64(params, "total"),
        url: params
            .get("url")
            .and_then(Value::as_str)
            .map(trim_byte_string)
            .filter(|url| !url.is_empty()),
    })
}

/// Read a text param, decoding its base64 twin when the plain one is absent.
fn text_param(params: &Value, plain: &str, encoded: &str) -> Option<String> {
    let text = match params.get(plain).and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => {
            let raw = params.get(encoded).and_then(Value::as_str)?;
            let bytes = Base64::decode_vec(raw).ok()?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
    };
    let trimmed = trim_byte_string(&text);
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_asset_list(body: &Value) -> Vec<AssetRecord> {
    body.get("assets")
        .and_then(Value::as_array)
        .map(|assets| {
            assets
                .iter()
                .filter_map(|asset| match parse_asset(asset) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::debug!(error = %e, "Skipping malformed asset in search results");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_txn_page(body: &Value) -> TxnPage {
    TxnPage {
        current_round: field_u64(body, "current-round"),
        next_token: body
            .get("next-token")
            .and_then(Value::as_str)
            .map(str::to_string),
        transactions: body
            .get("transactions")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    }
}
