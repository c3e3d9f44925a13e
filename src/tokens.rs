// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token descriptors and currency formatting on top of an SDK instance.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::{ConnectorError, ConnectorResult};
use crate::helpers::{format_number_short, trim_byte_string, with_timeout};
use crate::models::{AssetRecord, ChainSymbol, TokenMetadata};
use crate::networks::NetworkInterface;
use crate::stdlib::{Account, StdLib};

/// Fractional digits kept when abbreviating amounts.
const SHORT_FORMAT_PLACES: usize = 2;

/// Token id denoting the chain's native currency.
pub fn is_network_token(token_id: &str) -> bool {
    let id = token_id.trim();
    id.is_empty() || id == "0"
}

/// Descriptor for the native currency of `chain`.
pub fn make_network_token(chain: ChainSymbol) -> TokenMetadata {
    TokenMetadata {
        id: "0".to_string(),
        name: chain.as_str().to_string(),
        symbol: chain.as_str().to_string(),
        url: String::new(),
        amount: 0,
        supply: "0".to_string(),
        decimals: chain.decimals(),
        verified: true,
    }
}

/// Format atomic units with `decimals` (default: the instance's chain),
/// optionally abbreviated (`1550000` → `1.55M`).
pub fn format_currency(stdlib: &dyn StdLib, amount: u128, decimals: Option<u32>, abbreviate: bool) -> String {
    let decimals = decimals.unwrap_or_else(|| stdlib.connector().decimals());
    let formatted = stdlib.format_with_decimals(amount, decimals);
    if abbreviate {
        format_number_short(&formatted, SHORT_FORMAT_PLACES)
    } else {
        formatted
    }
}

/// Convert a display amount to atomic units.
pub fn parse_currency(stdlib: &dyn StdLib, amount: &str, decimals: Option<u32>) -> ConnectorResult<u128> {
    let decimals = decimals.unwrap_or_else(|| stdlib.connector().decimals());
    stdlib.parse_currency(amount, decimals)
}

/// Whether `account` has opted in to `token_id`. A failed lookup reads as
/// not opted in.
pub async fn check_has_token(account: &dyn Account, token_id: &str) -> bool {
    match account.token_accepted(token_id).await {
        Ok(accepted) => accepted,
        Err(e) => {
            tracing::debug!(token_id, error = %e, "Opt-in lookup failed");
            false
        }
    }
}

/// Opt `account` in to `token_id` unless it already is. Returns whether the
/// account ends up opted in.
pub async fn opt_in_to_asset(account: &dyn Account, token_id: &str) -> bool {
    if check_has_token(account, token_id).await {
        return true;
    }
    match account.token_accept(token_id).await {
        Ok(()) => {
            tracing::info!(token_id, "Opted in to asset");
            true
        }
        Err(e) => {
            tracing::warn!(token_id, error = %e, "Asset opt-in failed");
            false
        }
    }
}

/// A deployed contract's address in the form its chain displays it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractAddress {
    /// Algorand application id.
    Algorand(u64),
    /// `0x`-prefixed address on EVM-style chains.
    Hex(String),
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractAddress::Algorand(id) => write!(f, "{id}"),
            ContractAddress::Hex(addr) => f.write_str(addr),
        }
    }
}

/// Parse an encoded contract address for `chain`.
///
/// On Algorand the leading digits are read as the application id (`None`
/// when there are none). Elsewhere the value is cut at the first NUL byte
/// and given a `0x` prefix if it lacks one.
pub fn parse_address(chain: ChainSymbol, raw: &str) -> Option<ContractAddress> {
    let trimmed = raw.trim();
    if chain.is_algorand_like() {
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        return trimmed[..end].parse().ok().map(ContractAddress::Algorand);
    }

    let addr = trimmed.split('\0').next().unwrap_or_default();
    if addr.starts_with("0x") {
        Some(ContractAddress::Hex(addr.to_string()))
    } else {
        Some(ContractAddress::Hex(format!("0x{addr}")))
    }
}

/// Token metadata fields before normalization.
#[derive(Debug, Default)]
struct RawToken {
    name: String,
    symbol: String,
    url: String,
    supply: String,
    decimals: u32,
    verified: bool,
}

impl From<AssetRecord> for RawToken {
    fn from(asset: AssetRecord) -> Self {
        Self {
            name: asset.name,
            symbol: asset.symbol,
            url: asset.url.unwrap_or_default(),
            supply: asset.supply.to_string(),
            decimals: asset.decimals,
            verified: false,
        }
    }
}

impl From<TokenMetadata> for RawToken {
    fn from(token: TokenMetadata) -> Self {
        Self {
            name: token.name,
            symbol: token.symbol,
            url: token.url,
            supply: token.supply,
            decimals: token.decimals,
            verified: token.verified,
        }
    }
}

impl RawToken {
    /// Read the loosely-typed metadata reported by an SDK account.
    fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
        let supply = match value.get("supply") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        Self {
            name: text("name"),
            symbol: text("symbol"),
            url: text("url"),
            supply,
            decimals: value
                .get("decimals")
                .and_then(Value::as_u64)
                .and_then(|d| u32::try_from(d).ok())
                .unwrap_or(0),
            verified: value.get("verified").and_then(Value::as_bool).unwrap_or(false),
        }
    }

    fn into_metadata(self, token_id: &str, amount: u128) -> TokenMetadata {
        let name = trim_byte_string(&self.name);
        let symbol = trim_byte_string(&self.symbol);
        TokenMetadata {
            id: token_id.to_string(),
            name: if name.is_empty() { format!("Asset #{token_id}") } else { name },
            symbol: if symbol.is_empty() { format!("#{token_id}") } else { symbol },
            url: trim_byte_string(&self.url),
            amount,
            supply: self.supply,
            decimals: self.decimals,
            verified: self.verified,
        }
    }
}

/// Token descriptor plus `account`'s balance of it.
///
/// On Algorand both lookups are raced against `timeout`; a timed-out
/// balance reads as zero and timed-out metadata as not found. Other chains
/// report a zero balance and take metadata from the account itself.
pub async fn token_metadata(
    stdlib: Arc<dyn StdLib>,
    connector: Arc<dyn NetworkInterface>,
    token_id: &str,
    account: Arc<dyn Account>,
    timeout: Duration,
) -> ConnectorResult<TokenMetadata> {
    let chain = stdlib.connector();
    let on_algo = chain.is_algorand_like();
    let network_token = is_network_token(token_id);

    let fetch_balance = async {
        if !on_algo {
            return 0;
        }
        let stdlib = stdlib.clone();
        let account = account.clone();
        let token = (!network_token).then(|| token_id.to_string());
        let request = async move {
            match stdlib.balance_of(account.as_ref(), token.as_deref()).await {
                Ok(balance) => Some(balance),
                Err(e) => {
                    tracing::warn!(error = %e, "Token balance lookup failed");
                    None
                }
            }
        };
        with_timeout(request, None, timeout).await.unwrap_or(0)
    };

    let fetch_token = async {
        if network_token {
            return Ok(Some(RawToken::from(make_network_token(chain))));
        }
        if on_algo {
            let Ok(asset_id) = token_id.trim().parse::<u64>() else {
                return Ok(None);
            };
            let connector = connector.clone();
            let request = async move { connector.fetch_asset_by_id(asset_id, 0).await };
            return Ok(with_timeout(request, None, timeout).await.map(RawToken::from));
        }
        account
            .token_metadata(token_id)
            .await
            .map(|value| value.as_ref().map(RawToken::from_value))
    };

    let (balance, metadata) = tokio::join!(fetch_balance, fetch_token);
    match metadata? {
        Some(raw) => Ok(raw.into_metadata(token_id, balance)),
        None => Err(ConnectorError::TokenNotFound(token_id.to_string())),
    }
}
