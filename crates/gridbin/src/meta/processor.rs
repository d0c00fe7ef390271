// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! The metadata processor capability set.
//!
//! Everything the encode/decode pipeline needs from a metadata source is
//! behind [`MetadataProcessor`], so the same pipeline runs against a
//! networked cluster registry or against nothing at all. Absence is
//! always `Ok(None)` / empty — an error means the question could not be
//! answered, never "the type does not exist".

use super::type_meta::{BinaryTypeMetadata, EnumMapping};
use crate::error::Result;
use crate::{FieldId, SchemaId, TypeId};
use std::sync::Arc;

/// Capability set shared by every metadata strategy.
pub trait MetadataProcessor: Send + Sync {
    /// Whether this strategy can ever answer a lookup. The no-op
    /// strategy returns `false`, which lets decode paths fail name-based
    /// access with `MetadataUnavailable` instead of mistaking the
    /// permanent absence for an unknown type.
    fn supplies_metadata(&self) -> bool {
        true
    }

    /// Look up the metadata of one type.
    fn get_binary_type(&self, type_id: TypeId) -> Result<Option<Arc<BinaryTypeMetadata>>>;

    /// Enumerate all known types (diagnostics/tooling).
    fn get_binary_types(&self) -> Result<Vec<Arc<BinaryTypeMetadata>>>;

    /// Fetch one schema's ordered field-id list.
    fn get_schema(&self, type_id: TypeId, schema_id: SchemaId) -> Result<Option<Arc<[FieldId]>>>;

    /// Publish newly discovered metadata. Concurrent calls for the same
    /// type merge schema sets; they never overwrite.
    fn put_binary_types(&self, types: Vec<BinaryTypeMetadata>) -> Result<()>;

    /// Reserve a `TypeId <-> name` binding. `Ok(false)` means the id is
    /// bound to a different name.
    fn register_type(&self, type_id: TypeId, type_name: &str) -> Result<bool>;

    /// First-writer-wins enum registration; returns the canonical
    /// metadata, which may predate this call.
    fn register_enum(
        &self,
        type_name: &str,
        mapping: EnumMapping,
    ) -> Result<Arc<BinaryTypeMetadata>>;

    /// Resolve a type id back to its registered name.
    fn get_type_name(&self, type_id: TypeId) -> Result<Option<String>>;
}

/// Strategy for callers that want no metadata exchange at all.
///
/// Lookups answer absent, registrations succeed without persisting
/// anything. Encode paths behave exactly as with a real registry; decode
/// degrades to positional access (full footers make that useful).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetadataProcessor;

impl NoopMetadataProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataProcessor for NoopMetadataProcessor {
    fn supplies_metadata(&self) -> bool {
        false
    }

    fn get_binary_type(&self, _type_id: TypeId) -> Result<Option<Arc<BinaryTypeMetadata>>> {
        Ok(None)
    }

    fn get_binary_types(&self) -> Result<Vec<Arc<BinaryTypeMetadata>>> {
        Ok(Vec::new())
    }

    fn get_schema(&self, _type_id: TypeId, _schema_id: SchemaId) -> Result<Option<Arc<[FieldId]>>> {
        Ok(None)
    }

    fn put_binary_types(&self, _types: Vec<BinaryTypeMetadata>) -> Result<()> {
        Ok(())
    }

    fn register_type(&self, _type_id: TypeId, _type_name: &str) -> Result<bool> {
        Ok(true)
    }

    fn register_enum(
        &self,
        type_name: &str,
        mapping: EnumMapping,
    ) -> Result<Arc<BinaryTypeMetadata>> {
        // Echo the caller's mapping as canonical; nothing is stored.
        Ok(Arc::new(BinaryTypeMetadata::new_enum(type_name, mapping)))
    }

    fn get_type_name(&self, _type_id: TypeId) -> Result<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash;
    use crate::meta::type_meta::BinarySchema;

    #[test]
    fn lookups_always_answer_absent() {
        let noop = NoopMetadataProcessor::new();
        assert!(noop.get_binary_type(1).expect("ok").is_none());
        assert!(noop.get_binary_types().expect("ok").is_empty());
        assert!(noop.get_schema(1, 2).expect("ok").is_none());
        assert!(noop.get_type_name(1).expect("ok").is_none());
    }

    #[test]
    fn registrations_accept_without_becoming_visible() {
        let noop = NoopMetadataProcessor::new();
        let mut meta = BinaryTypeMetadata::new_object("Person", None);
        meta.add_schema(BinarySchema::new(vec![hash::field_id("id")]))
            .expect("schema");
        let type_id = meta.type_id();

        noop.put_binary_types(vec![meta]).expect("put");
        assert!(noop.get_binary_type(type_id).expect("ok").is_none());
        assert!(noop.register_type(type_id, "Person").expect("register"));
    }

    #[test]
    fn register_enum_echoes_the_mapping() {
        let noop = NoopMetadataProcessor::new();
        let mapping = EnumMapping::new(vec![("RED".into(), 0)]);
        let meta = noop.register_enum("Color", mapping.clone()).expect("enum");
        assert!(meta.is_enum());
        assert_eq!(meta.enum_mapping(), Some(&mapping));
        // Still not visible through lookups.
        assert!(noop.get_binary_type(meta.type_id()).expect("ok").is_none());
    }
}
