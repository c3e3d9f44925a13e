// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Event-emitting wallet transport (e.g. a WalletConnect client).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ConnectorResult;

/// Default WalletConnect bridge.
pub const WALLETCONNECT_BRIDGE: &str = "https://bridge.walletconnect.org";

/// Algorand signing method understood by WalletConnect wallets.
pub const ALGO_SIGN_TXN_METHOD: &str = "algo_signTxn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportEvent {
    Connect,
    SessionUpdate,
}

impl fmt::Display for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransportEvent::Connect => "connect",
            TransportEvent::SessionUpdate => "session_update",
        })
    }
}

/// Callback registered for transport events. An `Err` payload is the
/// transport's own error; the handler hands it back as a `ConnectorError`.
pub type EventHandler =
    Arc<dyn Fn(Result<serde_json::Value, String>) -> ConnectorResult<()> + Send + Sync>;

/// Custom JSON-RPC request forwarded to the wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRequest {
    pub method: String,
    pub params: serde_json::Value,
}

impl CustomRequest {
    /// `algo_signTxn` request for base64-encoded unsigned transactions.
    pub fn algo_sign_txns(txns: &[String]) -> Self {
        let entries: Vec<serde_json::Value> = txns
            .iter()
            .map(|txn| serde_json::json!({ "txn": txn }))
            .collect();
        Self {
            method: ALGO_SIGN_TXN_METHOD.to_string(),
            params: serde_json::Value::Array(vec![serde_json::Value::Array(entries)]),
        }
    }
}

#[async_trait]
pub trait WalletTransport: Send + Sync {
    fn connected(&self) -> bool;

    fn accounts(&self) -> Vec<String>;

    /// Start session creation. Suspends while the user interacts with the wallet.
    async fn create_session(&self) -> ConnectorResult<()>;

    async fn kill_session(&self) -> ConnectorResult<()>;

    async fn send_custom_request(&self, request: CustomRequest) -> ConnectorResult<serde_json::Value>;

    fn on(&self, event: TransportEvent, handler: EventHandler);
}

/// Constructs transport clients on demand.
pub trait TransportFactory: Send + Sync {
    fn create(&self) -> ConnectorResult<Arc<dyn WalletTransport>>;
}
