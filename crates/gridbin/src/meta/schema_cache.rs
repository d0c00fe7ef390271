// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Process-local schema cache.
//!
//! Append-only map from `(type_id, schema_id)` to the ordered field-id
//! list. Reads are lock-free via the sharded map; a racing `put` for the
//! same key is idempotent because the field-id list is a pure function of
//! the key.

use crate::{FieldId, SchemaId, TypeId};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cache hit/miss counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
}

/// Append-only `(TypeId, SchemaId) -> field ids` cache.
pub struct SchemaCache {
    inner: DashMap<(TypeId, SchemaId), Arc<[FieldId]>>,
    stats: RwLock<LookupStats>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
            stats: RwLock::new(LookupStats::default()),
        }
    }

    pub fn get(&self, type_id: TypeId, schema_id: SchemaId) -> Option<Arc<[FieldId]>> {
        let found = self
            .inner
            .get(&(type_id, schema_id))
            .map(|entry| Arc::clone(entry.value()));
        let mut stats = self.stats.write();
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        found
    }

    /// Idempotent insert; the first writer wins and later identical
    /// writes are no-ops.
    pub fn put(&self, type_id: TypeId, schema_id: SchemaId, field_ids: Arc<[FieldId]>) {
        self.inner.entry((type_id, schema_id)).or_insert(field_ids);
    }

    pub fn contains(&self, type_id: TypeId, schema_id: SchemaId) -> bool {
        self.inner.contains_key(&(type_id, schema_id))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn stats(&self) -> LookupStats {
        *self.stats.read()
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}
