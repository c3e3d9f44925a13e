// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Plumbing
//!
//! Wallet fallbacks installed on an SDK instance, and the session handshake
//! that must complete before any WalletConnect-style signing call.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`signal`] | One-shot rendezvous between a connect event and its waiters |
//! | [`transport`] | Event-emitting transport client capability |
//! | [`session`] | Lazy client construction and the handshake sequence |

pub mod session;
pub mod signal;
pub mod transport;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

pub use session::WalletSession;
pub use signal::Signal;
pub use transport::{CustomRequest, EventHandler, TransportEvent, TransportFactory, WalletTransport};

use crate::error::ConnectorResult;
use crate::providers::ProviderEnv;

/// Anything able to produce an address and sign transactions for the SDK.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    async fn get_addr(&self) -> ConnectorResult<String>;

    /// Sign base64-encoded transactions. `None` entries were not signed.
    async fn sign_txns(&self, txns: &[String]) -> ConnectorResult<Vec<Option<String>>>;
}

/// Wallet backing the SDK when no injected browser wallet is present.
#[derive(Clone)]
pub enum WalletProvider {
    /// Hosted web wallet; the SDK drives it on its own.
    WebWallet,
    /// External wallet reached through a session handshake.
    WalletConnect(Arc<dyn WalletSigner>),
}

impl WalletProvider {
    pub fn name(&self) -> &'static str {
        match self {
            WalletProvider::WebWallet => "web-wallet",
            WalletProvider::WalletConnect(_) => "walletconnect",
        }
    }
}

impl fmt::Debug for WalletProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options handed to the SDK's `wallet_fallback` builder.
#[derive(Debug, Clone)]
pub struct WalletFallbackOpts {
    pub provider: WalletProvider,
    /// Filled in from the resolved environment before the fallback is built.
    pub provider_env: Option<ProviderEnv>,
}

impl WalletFallbackOpts {
    pub fn new(provider: WalletProvider) -> Self {
        Self {
            provider,
            provider_env: None,
        }
    }

    pub fn with_provider_env(mut self, env: ProviderEnv) -> Self {
        self.provider_env = Some(env);
        self
    }
}
