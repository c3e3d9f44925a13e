// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet session handshake.
//!
//! ## Flow
//!
//! 1. The transport client is created lazily, once, and its `connect` and
//!    `session_update` events are wired to notify the current [`Signal`].
//! 2. A disconnected transport starts session creation; this is where the
//!    caller waits on the user's wallet. No timeout is imposed here.
//! 3. An already-connected transport (session resumption) notifies at once,
//!    since `connect` will not fire again.
//! 4. Address lookup and signing wait on the signal before touching the
//!    transport's accounts.
//!
//! `disconnect` kills the session, drops the client and installs a fresh
//! signal so the next handshake starts clean.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;

use super::signal::Signal;
use super::transport::{CustomRequest, EventHandler, TransportEvent, TransportFactory, WalletTransport};
use super::WalletSigner;
use crate::error::{ConnectorError, ConnectorResult};
use crate::models::ChainSymbol;

/// Shared slot holding the signal of the current handshake.
type SignalSlot = Arc<Mutex<Arc<Signal>>>;

fn current_signal(slot: &SignalSlot) -> Arc<Signal> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// WalletConnect-style session bound to one chain.
pub struct WalletSession {
    chain: ChainSymbol,
    factory: Arc<dyn TransportFactory>,
    client: AsyncMutex<Option<Arc<dyn WalletTransport>>>,
    ready: SignalSlot,
}

impl WalletSession {
    pub fn new(chain: ChainSymbol, factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            chain,
            factory,
            client: AsyncMutex::new(None),
            ready: Arc::new(Mutex::new(Arc::new(Signal::new()))),
        }
    }

    pub fn chain(&self) -> ChainSymbol {
        self.chain
    }

    /// Signal for the handshake currently in progress.
    pub fn signal(&self) -> Arc<Signal> {
        current_signal(&self.ready)
    }

    /// True when a client exists and reports an active session.
    pub async fn is_connected(&self) -> bool {
        self.client
            .lock()
            .await
            .as_ref()
            .is_some_and(|client| client.connected())
    }

    /// Return the transport client, creating and wiring it on first use.
    pub async fn ensure_transport(&self) -> ConnectorResult<Arc<dyn WalletTransport>> {
        let mut client = self.client.lock().await;
        if let Some(existing) = client.as_ref() {
            return Ok(existing.clone());
        }

        let transport = self.factory.create()?;
        let handler = self.connect_handler();
        transport.on(TransportEvent::SessionUpdate, handler.clone());
        transport.on(TransportEvent::Connect, handler);
        tracing::info!(chain = %self.chain, "Wallet transport created");

        *client = Some(transport.clone());
        Ok(transport)
    }

    /// Handler bound to the handshake signal current at wiring time.
    fn connect_handler(&self) -> EventHandler {
        let ready = self.signal();
        let chain = self.chain;
        Arc::new(move |payload| match payload {
            Ok(_) => {
                tracing::debug!(%chain, "Wallet transport connected");
                ready.notify();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%chain, error = %e, "Wallet transport connect event failed");
                Err(ConnectorError::Transport(e))
            }
        })
    }

    /// Make sure a session exists or is being established.
    pub async fn ensure_session(&self) -> ConnectorResult<()> {
        let transport = self.ensure_transport().await?;
        if transport.connected() {
            tracing::debug!(chain = %self.chain, "Wallet session exists");
            self.signal().notify();
        } else {
            tracing::info!(chain = %self.chain, "Creating wallet session");
            transport.create_session().await?;
        }
        Ok(())
    }

    async fn connected_transport(&self) -> ConnectorResult<Arc<dyn WalletTransport>> {
        self.ensure_session().await?;
        self.signal().wait().await;
        self.ensure_transport().await
    }

    /// First account of the established session.
    pub async fn get_addr(&self) -> ConnectorResult<String> {
        let transport = self.connected_transport().await?;
        transport
            .accounts()
            .into_iter()
            .next()
            .ok_or_else(|| ConnectorError::Transport("wallet session has no accounts".to_string()))
    }

    /// Forward a signing request. Transport errors propagate unchanged.
    pub async fn sign_txns(&self, txns: &[String]) -> ConnectorResult<Vec<Option<String>>> {
        let transport = self.connected_transport().await?;
        let request = CustomRequest::algo_sign_txns(txns);
        tracing::debug!(chain = %self.chain, count = txns.len(), "Forwarding signing request");

        let response = transport.send_custom_request(request).await.map_err(|e| {
            tracing::warn!(chain = %self.chain, error = %e, "Wallet signing request failed");
            e
        })?;

        serde_json::from_value(response)
            .map_err(|e| ConnectorError::Signing(format!("unexpected signing response: {e}")))
    }

    /// Tear down the session and reset the handshake.
    pub async fn disconnect(&self) -> ConnectorResult<()> {
        let client = {
            let mut guard = self.client.lock().await;
            *self.ready.lock().unwrap_or_else(PoisonError::into_inner) = Arc::new(Signal::new());
            guard.take()
        };

        match client {
            Some(client) => {
                tracing::info!(chain = %self.chain, "Killing wallet session");
                client.kill_session().await
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WalletSigner for WalletSession {
    async fn get_addr(&self) -> ConnectorResult<String> {
        WalletSession::get_addr(self).await
    }

    async fn sign_txns(&self, txns: &[String]) -> ConnectorResult<Vec<Option<String>>> {
        WalletSession::sign_txns(self, txns).await
    }
}
