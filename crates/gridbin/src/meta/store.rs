// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Process-local type-metadata store.
//!
//! A read-through cache of `TypeId -> BinaryTypeMetadata`. Entries merge
//! under the map's per-key entry lock, so concurrent registrations of
//! different schemas for one type serialize there and converge without
//! any store-wide locking. The local view is advisory: it may lag the
//! authoritative registry, never the other way around.

use super::type_meta::BinaryTypeMetadata;
use crate::error::Result;
use crate::TypeId;
use dashmap::DashMap;
use std::sync::Arc;

/// Local `TypeId -> metadata` view.
pub struct LocalTypeStore {
    inner: DashMap<TypeId, Arc<BinaryTypeMetadata>>,
}

impl LocalTypeStore {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    pub fn get(&self, type_id: TypeId) -> Option<Arc<BinaryTypeMetadata>> {
        self.inner.get(&type_id).map(|e| Arc::clone(e.value()))
    }

    pub fn all(&self) -> Vec<Arc<BinaryTypeMetadata>> {
        self.inner.iter().map(|e| Arc::clone(e.value())).collect()
    }

    /// Merge metadata in under the entry lock (first success wins,
    /// identical re-registrations are no-ops). Returns the canonical
    /// entry after the merge.
    pub fn merge(&self, incoming: BinaryTypeMetadata) -> Result<Arc<BinaryTypeMetadata>> {
        let type_id = incoming.type_id();
        match self.inner.entry(type_id) {
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let canonical = Arc::new(incoming);
                slot.insert(Arc::clone(&canonical));
                Ok(canonical)
            }
            dashmap::mapref::entry::Entry::Occupied(mut slot) => {
                match slot.get().merge(&incoming)? {
                    Some(merged) => {
                        let canonical = Arc::new(merged);
                        slot.insert(Arc::clone(&canonical));
                        Ok(canonical)
                    }
                    None => Ok(Arc::clone(slot.get())),
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for LocalTypeStore {
    fn default() -> Self {
        Self::new()
    }
}
