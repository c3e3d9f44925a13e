// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage
//!
//! Persistent backends for [`KeyValueStore`](crate::store::KeyValueStore)
//! and the in-process asset metadata cache.
//!
//! Browser hosts supply their own store; native hosts use the embedded redb
//! file configured through `CONNECTOR_STORE_PATH`.

pub mod asset_cache;
pub mod kv_database;

pub use asset_cache::AssetCache;
pub use kv_database::{RedbStore, StorageError, StorageResult};
