// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error types shared across the connector.
//!
//! Hard failures (`ConnectorError`) surface synchronously to the calling
//! application. Read-only lookups use [`QueryError`] internally and are turned
//! into neutral values at the [`NetworkInterface`](crate::networks::NetworkInterface)
//! boundary, so a failed lookup never cancels a sibling request.

/// Message used when an SDK slot is read before it was populated.
const UNINSTANTIATED: &str = "SDK instance is not instantiated; load or attach one first";

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// A default or named SDK instance was requested before it was populated.
    #[error("{}", uninstantiated_message(.key.as_deref()))]
    Uninstantiated { key: Option<String> },

    /// An unrecognized network tier or provider string.
    #[error("Invalid provider selection: got \"{0}\"")]
    InvalidProvider(String),

    /// The wallet transport rejected a signing request.
    #[error("Signing request failed: {0}")]
    Signing(String),

    /// The wallet transport failed outside of signing (session, events).
    #[error("Wallet transport error: {0}")]
    Transport(String),

    /// The SDK bootstrap function failed to produce an instance.
    #[error("SDK bootstrap failed: {0}")]
    Bootstrap(String),

    /// An SDK account operation (opt-in lookup or request) failed.
    #[error("Account operation failed: {0}")]
    Account(String),

    /// Token metadata could not be found for the requested id.
    #[error("Token \"{0}\" not found")]
    TokenNotFound(String),

    /// The indexer client could not be constructed from a provider environment.
    #[error("Indexer setup failed: {0}")]
    Indexer(#[from] QueryError),
}

fn uninstantiated_message(key: Option<&str>) -> String {
    match key {
        Some(key) => format!("{UNINSTANTIATED} (instance key: {key})"),
        None => UNINSTANTIATED.to_string(),
    }
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Failure of a read-only indexer or account query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Indexer returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode indexer response: {0}")]
    Decode(String),

    #[error("Invalid indexer URL: {0}")]
    InvalidUrl(String),
}

pub type QueryResult<T> = Result<T, QueryError>;
