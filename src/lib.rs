// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational dApp Connector - Multi-chain connector and wallet session layer
//!
//! Sits between dApp front-end code and an underlying chain SDK. It keeps
//! the user's chain and network selection, resolves provider environments,
//! owns one default and any number of named SDK instances, and drives the
//! WalletConnect session handshake.
//!
//! ## Modules
//!
//! - `environment` - Persisted chain and network selection
//! - `providers` - Provider environment resolution
//! - `networks` - Per-chain network interfaces and the Algorand indexer
//! - `stdlib` - SDK capability traits and the instance manager
//! - `wallet` - WalletConnect session handshake
//! - `account` - Connected-user hydration and reconnect hints
//! - `state` - The `ConnectorContext` a host builds once

pub mod account;
pub mod config;
pub mod environment;
pub mod error;
pub mod helpers;
pub mod models;
pub mod networks;
pub mod providers;
pub mod state;
pub mod stdlib;
pub mod storage;
pub mod store;
pub mod tokens;
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{init_tracing, ConnectorConfig};
pub use error::{ConnectorError, ConnectorResult};
pub use state::ConnectorContext;
