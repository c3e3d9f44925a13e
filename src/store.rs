// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key-value store abstraction used for the chain selection and the
//! reconnect address hint.
//!
//! Writes are treated as infallible by callers. Backends that can fail log
//! the failure and carry on; see [`crate::storage::RedbStore`].

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::ConnectorConfig;
use crate::storage::RedbStore;

/// Minimal `getItem` / `setItem` / `removeItem` surface.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// Non-persistent fallback used when no durable store is available.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for InMemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Open the store selected by configuration.
///
/// A configured path opens a durable [`RedbStore`]; if that fails, or no
/// path is configured, the in-memory fallback is used.
pub fn open_store(config: &ConnectorConfig) -> Arc<dyn KeyValueStore> {
    let Some(path) = config.store_path.as_deref() else {
        return Arc::new(InMemoryStore::new());
    };

    match RedbStore::open(path) {
        Ok(store) => {
            tracing::info!(path = %path.display(), "Opened durable connector store");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to open durable store, falling back to memory"
            );
            Arc::new(InMemoryStore::new())
        }
    }
}
