// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Marshalling orchestration.
//!
//! `BinaryContext` is the process-scoped state a client or server node
//! constructs once at startup: configuration, the schema cache, and the
//! metadata processor. It is passed explicitly wherever encode/decode
//! happens; there are no ambient globals.
//!
//! The marshaller keeps metadata exchange off the hot path: a schema is
//! published the first time it is seen and never again, and decode only
//! asks the processor when the schema cache cannot answer. `Unreachable`
//! failures are retried exactly once before they surface.

use crate::config::BinaryConfiguration;
use crate::error::{MetaError, Result};
use crate::meta::{
    BinarySchema, BinaryTypeMetadata, EnumMapping, MetadataProcessor, SchemaCache,
};
use crate::wire::writer::{encode_enum, encode_null};
use crate::wire::{BinaryObjectBuilder, BinaryObjectReader, BinaryObjectWriter, BinaryValue};
use crate::{hash, FieldId};
use std::sync::Arc;

/// Process-scoped marshalling state.
pub struct BinaryContext {
    config: BinaryConfiguration,
    schemas: SchemaCache,
    processor: Arc<dyn MetadataProcessor>,
}

impl BinaryContext {
    pub fn new(config: BinaryConfiguration, processor: Arc<dyn MetadataProcessor>) -> Self {
        Self {
            config,
            schemas: SchemaCache::new(),
            processor,
        }
    }

    pub fn config(&self) -> &BinaryConfiguration {
        &self.config
    }

    pub fn schema_cache(&self) -> &SchemaCache {
        &self.schemas
    }

    pub fn processor(&self) -> &Arc<dyn MetadataProcessor> {
        &self.processor
    }
}

/// Encodes drafts and decodes wire objects against one context.
#[derive(Clone)]
pub struct Marshaller {
    ctx: Arc<BinaryContext>,
}

impl Marshaller {
    pub fn new(ctx: Arc<BinaryContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<BinaryContext> {
        &self.ctx
    }

    /// Encode a draft, registering its type and schema on first sight.
    pub fn marshal(&self, draft: &BinaryObjectBuilder) -> Result<Vec<u8>> {
        let type_name = draft.type_name();
        let type_id = hash::type_id(type_name);

        if let Some(affinity) = draft.affinity_key_field() {
            let affinity_id = hash::field_id(affinity);
            let present = draft
                .fields()
                .iter()
                .any(|(name, _)| hash::field_id(name) == affinity_id);
            if !present {
                return Err(MetaError::MergeConflict {
                    type_name: type_name.to_string(),
                    reason: format!("affinity key field '{}' is not a field", affinity),
                });
            }
        }

        let compact = self.ctx.config.is_compact_footer();
        let mut writer = BinaryObjectWriter::new(type_id, compact);
        for (name, value) in draft.fields() {
            writer.write_field(hash::field_id(name), value);
        }
        if !draft.raw_bytes().is_empty() {
            writer.write_raw(draft.raw_bytes());
        }
        let encoded = writer.finish();

        if !self.ctx.schemas.contains(type_id, encoded.schema_id) {
            self.register_schema(
                type_id,
                type_name,
                draft.affinity_key_field(),
                encoded.schema_id,
                &encoded.field_ids,
            )?;
        }
        Ok(encoded.bytes)
    }

    /// Encode a standalone enum value.
    pub fn marshal_enum(&self, type_name: &str, ordinal: i32) -> Vec<u8> {
        encode_enum(hash::type_id(type_name), ordinal)
    }

    /// Encode a null object.
    pub fn marshal_null(&self) -> Vec<u8> {
        encode_null()
    }

    /// Register an enumeration (first writer wins cluster-wide).
    pub fn register_enum(
        &self,
        type_name: &str,
        pairs: &[(&str, i32)],
    ) -> Result<Arc<BinaryTypeMetadata>> {
        let mapping = EnumMapping::new(
            pairs
                .iter()
                .map(|(name, ordinal)| ((*name).to_string(), *ordinal))
                .collect(),
        );
        retry_once(|| self.ctx.processor.register_enum(type_name, mapping.clone()))
    }

    /// Wrap wire bytes for lazy decoding. Only the geometry is checked
    /// here; field access happens on demand.
    pub fn unmarshal(&self, bytes: Vec<u8>) -> Result<BinaryObject> {
        let reader = BinaryObjectReader::parse(bytes)?;
        Ok(BinaryObject {
            reader,
            ctx: Arc::clone(&self.ctx),
        })
    }

    fn register_schema(
        &self,
        type_id: crate::TypeId,
        type_name: &str,
        affinity: Option<&str>,
        schema_id: crate::SchemaId,
        field_ids: &[FieldId],
    ) -> Result<()> {
        let processor = &self.ctx.processor;
        let bound = retry_once(|| processor.register_type(type_id, type_name))?;
        if !bound {
            let existing = processor
                .get_type_name(type_id)
                .unwrap_or(None)
                .unwrap_or_else(|| "<unknown>".to_string());
            return Err(MetaError::NameCollision {
                type_id,
                existing,
                requested: type_name.to_string(),
            });
        }

        let mut meta =
            BinaryTypeMetadata::new_object(type_name, affinity.map(ToString::to_string));
        meta.add_schema(BinarySchema::from_parts(schema_id, field_ids.to_vec()))?;
        retry_once(|| processor.put_binary_types(vec![meta.clone()]))?;

        log::debug!(
            "registered schema {} of '{}' ({} fields)",
            schema_id,
            type_name,
            field_ids.len()
        );
        self.ctx.schemas.put(type_id, schema_id, field_ids.into());
        Ok(())
    }
}

/// A decoded object bound to its context for metadata resolution.
pub struct BinaryObject {
    reader: BinaryObjectReader,
    ctx: Arc<BinaryContext>,
}

impl BinaryObject {
    pub fn type_id(&self) -> crate::TypeId {
        self.reader.type_id()
    }

    pub fn schema_id(&self) -> crate::SchemaId {
        self.reader.schema_id()
    }

    pub fn is_null(&self) -> bool {
        self.reader.is_null()
    }

    pub fn is_enum(&self) -> bool {
        self.reader.is_enum()
    }

    pub fn field_count(&self) -> usize {
        self.reader.field_count()
    }

    pub fn bytes(&self) -> &[u8] {
        self.reader.bytes()
    }

    /// Raw-mode suffix, when present.
    pub fn raw(&self) -> Option<&[u8]> {
        self.reader.raw()
    }

    /// Positional field access; works with no metadata at all.
    pub fn field_at(&self, index: usize) -> Result<BinaryValue> {
        Ok(self.reader.field_at(index)?)
    }

    /// All field values in schema order.
    pub fn field_values(&self) -> Result<Vec<BinaryValue>> {
        (0..self.reader.field_count())
            .map(|index| self.field_at(index))
            .collect()
    }

    /// By-name field access.
    ///
    /// Full-footer objects resolve from their own footer. Compact-footer
    /// objects need the schema: cache first, then one processor fetch.
    /// `Ok(None)` means the object has no such field.
    pub fn field(&self, name: &str) -> Result<Option<BinaryValue>> {
        if self.reader.is_null() || self.reader.is_enum() {
            return Ok(None);
        }
        let field_id = hash::field_id(name);
        if !self.reader.is_compact_footer() {
            return Ok(self.reader.field_by_footer_id(field_id)?);
        }

        let schema = self.resolve_schema()?;
        Ok(self.reader.field_by_schema(field_id, &schema)?)
    }

    /// Enum ordinal of an enum object.
    pub fn ordinal(&self) -> Result<i32> {
        Ok(self.reader.ordinal()?)
    }

    /// Enum constant name; requires the enum's registered mapping.
    pub fn enum_name(&self) -> Result<String> {
        let ordinal = self.ordinal()?;
        let type_id = self.reader.type_id();
        if !self.ctx.processor.supplies_metadata() {
            return Err(MetaError::MetadataUnavailable {
                what: format!("enum mapping of type {}", type_id),
            });
        }
        let meta = retry_once(|| self.ctx.processor.get_binary_type(type_id))?.ok_or_else(|| {
            MetaError::NotFound {
                what: format!("metadata for enum type {}", type_id),
            }
        })?;
        let mapping = meta.enum_mapping().ok_or_else(|| MetaError::Corrupt {
            reason: format!("type {} is not an enum", type_id),
        })?;
        mapping
            .name_of(ordinal)
            .map(ToString::to_string)
            .ok_or_else(|| MetaError::Corrupt {
                reason: format!("ordinal {} is not in the mapping of type {}", ordinal, type_id),
            })
    }

    /// Registered name of this object's type, when known.
    pub fn type_name(&self) -> Result<Option<String>> {
        retry_once(|| self.ctx.processor.get_type_name(self.reader.type_id()))
    }

    fn resolve_schema(&self) -> Result<Arc<[FieldId]>> {
        let type_id = self.reader.type_id();
        let schema_id = self.reader.schema_id();
        if let Some(schema) = self.ctx.schemas.get(type_id, schema_id) {
            return Ok(schema);
        }
        if !self.ctx.processor.supplies_metadata() {
            return Err(MetaError::MetadataUnavailable {
                what: format!(
                    "schema {} of type {} (no metadata source configured)",
                    schema_id, type_id
                ),
            });
        }
        let fetched = retry_once(|| self.ctx.processor.get_schema(type_id, schema_id))?;
        match fetched {
            Some(schema) => {
                self.ctx.schemas.put(type_id, schema_id, Arc::clone(&schema));
                Ok(schema)
            }
            // The wire referenced it, so absence means the data cannot
            // be interpreted, now or ever.
            None => Err(MetaError::Corrupt {
                reason: format!(
                    "schema {} of type {} is unknown to the registry",
                    schema_id, type_id
                ),
            }),
        }
    }
}

/// Run `op`, retrying exactly once when the registry is unreachable.
fn retry_once<T>(op: impl Fn() -> Result<T>) -> Result<T> {
    match op() {
        Err(MetaError::Unreachable { reason }) => {
            log::warn!("metadata registry unreachable ({}), retrying once", reason);
            op()
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{LocalTypeStore, NoopMetadataProcessor};
    use crate::{SchemaId, TypeId};
    use parking_lot::Mutex;

    /// Minimal in-process metadata source for compact-footer tests.
    #[derive(Default)]
    struct InMemoryProcessor {
        store: LocalTypeStore,
        schema_fetches: Mutex<u32>,
    }

    impl MetadataProcessor for InMemoryProcessor {
        fn get_binary_type(
            &self,
            type_id: TypeId,
        ) -> Result<Option<Arc<BinaryTypeMetadata>>> {
            Ok(self.store.get(type_id))
        }

        fn get_binary_types(&self) -> Result<Vec<Arc<BinaryTypeMetadata>>> {
            Ok(self.store.all())
        }

        fn get_schema(
            &self,
            type_id: TypeId,
            schema_id: SchemaId,
        ) -> Result<Option<Arc<[FieldId]>>> {
            *self.schema_fetches.lock() += 1;
            Ok(self.store.get(type_id).and_then(|meta| {
                meta.schema(schema_id).map(|s| Arc::clone(s.field_ids()))
            }))
        }

        fn put_binary_types(&self, types: Vec<BinaryTypeMetadata>) -> Result<()> {
            for meta in types {
                self.store.merge(meta)?;
            }
            Ok(())
        }

        fn register_type(&self, type_id: TypeId, type_name: &str) -> Result<bool> {
            match self.store.get(type_id) {
                Some(meta) => {
                    Ok(meta.type_name().to_lowercase() == type_name.to_lowercase())
                }
                None => Ok(true),
            }
        }

        fn register_enum(
            &self,
            type_name: &str,
            mapping: EnumMapping,
        ) -> Result<Arc<BinaryTypeMetadata>> {
            self.store
                .merge(BinaryTypeMetadata::new_enum(type_name, mapping))
        }

        fn get_type_name(&self, type_id: TypeId) -> Result<Option<String>> {
            Ok(self.store.get(type_id).map(|m| m.type_name().to_string()))
        }
    }

    fn marshaller_with(processor: Arc<dyn MetadataProcessor>, compact: bool) -> Marshaller {
        let ctx = BinaryContext::new(
            BinaryConfiguration::new().compact_footer(compact),
            processor,
        );
        Marshaller::new(Arc::new(ctx))
    }

    fn person() -> BinaryObjectBuilder {
        BinaryObjectBuilder::new("Person")
            .field("Id", 100i32)
            .field("Name", "foo")
    }

    #[test]
    fn roundtrip_with_metadata_source() {
        let m = marshaller_with(Arc::new(InMemoryProcessor::default()), true);
        let bytes = m.marshal(&person()).expect("marshal");
        let obj = m.unmarshal(bytes).expect("unmarshal");

        assert_eq!(obj.field("Id").expect("id"), Some(BinaryValue::I32(100)));
        assert_eq!(
            obj.field("name").expect("name"),
            Some(BinaryValue::String("foo".into()))
        );
        assert_eq!(obj.field("missing").expect("missing"), None);
        assert_eq!(obj.type_name().expect("name"), Some("Person".to_string()));
    }

    #[test]
    fn schema_is_published_once() {
        let processor = Arc::new(InMemoryProcessor::default());
        let m = marshaller_with(processor.clone(), true);
        for _ in 0..3 {
            m.marshal(&person()).expect("marshal");
        }
        let metas = processor.get_binary_types().expect("types");
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].schemas().len(), 1);
        assert_eq!(m.context().schema_cache().len(), 1);
    }

    #[test]
    fn noop_strategy_compact_name_access_is_metadata_unavailable() {
        let m = marshaller_with(Arc::new(NoopMetadataProcessor::new()), true);
        let bytes = m.marshal(&person()).expect("marshal");
        let obj = m.unmarshal(bytes).expect("unmarshal");

        // Positional access still works.
        assert_eq!(obj.field_at(0).expect("pos"), BinaryValue::I32(100));
        assert!(matches!(
            obj.field("Name").unwrap_err(),
            MetaError::MetadataUnavailable { .. }
        ));
    }

    #[test]
    fn noop_strategy_full_footer_serves_names_from_the_wire() {
        let m = marshaller_with(Arc::new(NoopMetadataProcessor::new()), false);
        let bytes = m.marshal(&person()).expect("marshal");
        let obj = m.unmarshal(bytes).expect("unmarshal");
        assert_eq!(
            obj.field("Name").expect("name"),
            Some(BinaryValue::String("foo".into()))
        );
    }

    #[test]
    fn decode_fetches_schema_exactly_once() {
        let processor = Arc::new(InMemoryProcessor::default());
        let writer = marshaller_with(processor.clone(), true);
        let bytes = writer.marshal(&person()).expect("marshal");

        // A second context shares the processor but has a cold cache.
        let reader = marshaller_with(processor.clone(), true);
        let obj = reader.unmarshal(bytes.clone()).expect("unmarshal");
        assert_eq!(obj.field("Id").expect("id"), Some(BinaryValue::I32(100)));
        assert_eq!(*processor.schema_fetches.lock(), 1);

        let again = reader.unmarshal(bytes).expect("unmarshal");
        assert!(again.field("Name").expect("name").is_some());
        assert_eq!(*processor.schema_fetches.lock(), 1);
    }

    #[test]
    fn unknown_schema_on_wire_is_corrupt() {
        let processor = Arc::new(InMemoryProcessor::default());
        let writer = marshaller_with(Arc::new(NoopMetadataProcessor::new()), true);
        let bytes = writer.marshal(&person()).expect("marshal");

        // The reader has a real metadata source, but nothing was ever
        // registered there.
        let reader = marshaller_with(processor, true);
        let obj = reader.unmarshal(bytes).expect("unmarshal");
        assert!(matches!(
            obj.field("Id").unwrap_err(),
            MetaError::Corrupt { .. }
        ));
    }

    #[test]
    fn name_collision_surfaces_on_marshal() {
        let processor = Arc::new(InMemoryProcessor::default());
        // Seed the store with a different name under Person's id.
        processor
            .store
            .merge(BinaryTypeMetadata::from_parts(
                hash::type_id("Person"),
                "Somebody".into(),
                None,
                Vec::new(),
                None,
            ))
            .expect("seed");

        let m = marshaller_with(processor, true);
        match m.marshal(&person()).unwrap_err() {
            MetaError::NameCollision { existing, requested, .. } => {
                assert_eq!(existing, "Somebody");
                assert_eq!(requested, "Person");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn enum_objects_resolve_names_through_metadata() {
        let processor = Arc::new(InMemoryProcessor::default());
        let m = marshaller_with(processor, true);
        m.register_enum("Color", &[("RED", 0), ("GREEN", 1)])
            .expect("register");

        let obj = m
            .unmarshal(m.marshal_enum("Color", 1))
            .expect("unmarshal");
        assert!(obj.is_enum());
        assert_eq!(obj.ordinal().expect("ordinal"), 1);
        assert_eq!(obj.enum_name().expect("name"), "GREEN");

        // Named fields do not exist on enums.
        assert_eq!(obj.field("anything").expect("field"), None);
    }

    #[test]
    fn enum_name_without_metadata_source_fails_clearly() {
        let m = marshaller_with(Arc::new(NoopMetadataProcessor::new()), false);
        let obj = m
            .unmarshal(m.marshal_enum("Color", 0))
            .expect("unmarshal");
        assert_eq!(obj.ordinal().expect("ordinal"), 0);
        assert!(matches!(
            obj.enum_name().unwrap_err(),
            MetaError::MetadataUnavailable { .. }
        ));
    }

    #[test]
    fn null_objects_roundtrip() {
        let m = marshaller_with(Arc::new(NoopMetadataProcessor::new()), true);
        let obj = m.unmarshal(m.marshal_null()).expect("unmarshal");
        assert!(obj.is_null());
        assert_eq!(obj.field("x").expect("field"), None);
        assert_eq!(obj.field_count(), 0);
    }

    #[test]
    fn affinity_key_must_reference_a_field() {
        let m = marshaller_with(Arc::new(NoopMetadataProcessor::new()), true);
        let draft = BinaryObjectBuilder::new("Order")
            .field("id", 1i32)
            .affinity_key("customer");
        assert!(matches!(
            m.marshal(&draft).unwrap_err(),
            MetaError::MergeConflict { .. }
        ));
    }
}
