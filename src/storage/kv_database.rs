// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable key-value store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `kv`: key → UTF-8 value (chain selection, network tier, reconnect hint)

use std::path::Path;

use redb::{Database, ReadableDatabase, TableDefinition};

use crate::store::KeyValueStore;

/// Single table holding every persisted item.
const KV: TableDefinition<&str, &str> = TableDefinition::new("kv");

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent [`KeyValueStore`] for non-browser hosts.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so read transactions on a fresh file succeed
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KV)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KV)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    pub fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn delete(&self, key: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl KeyValueStore for RedbStore {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read connector store");
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Err(e) = self.put(key, value) {
            tracing::warn!(key, error = %e, "Failed to write connector store");
        }
    }

    fn remove_item(&self, key: &str) {
        if let Err(e) = self.delete(key) {
            tracing::warn!(key, error = %e, "Failed to remove connector store item");
        }
    }
}
