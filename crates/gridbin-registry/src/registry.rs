// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! The cluster's keeper of record for type metadata.
//!
//! Name bindings and metadata merges are first-success-wins under per-key
//! entry locks: identical registrations from racing writers collapse to
//! one canonical entry, divergent ones fail for the later writer.
//! Metadata is never deleted; the registry's content only survives as
//! long as the process does.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use gridbin::error::{MetaError, Result};
use gridbin::meta::{BinaryTypeMetadata, EnumMapping, LocalTypeStore};
use gridbin::{FieldId, SchemaId, TypeId};
use std::sync::Arc;

/// Authoritative `TypeId -> metadata` store plus the id/name bindings.
pub struct MetadataRegistry {
    /// Merge semantics are shared with the process-local stores; what
    /// makes this one authoritative is who writes to it, not the code.
    types: LocalTypeStore,
    names: DashMap<TypeId, Arc<str>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self {
            types: LocalTypeStore::new(),
            names: DashMap::new(),
        }
    }

    pub fn get(&self, type_id: TypeId) -> Option<Arc<BinaryTypeMetadata>> {
        self.types.get(type_id)
    }

    /// Every registered type (diagnostics/tooling).
    pub fn all(&self) -> Vec<Arc<BinaryTypeMetadata>> {
        self.types.all()
    }

    pub fn get_schema(&self, type_id: TypeId, schema_id: SchemaId) -> Option<Arc<[FieldId]>> {
        self.types
            .get(type_id)?
            .schema(schema_id)
            .map(|schema| Arc::clone(schema.field_ids()))
    }

    /// Reserve a `TypeId <-> name` binding. `false` when the id is bound
    /// to a different name. The first writer's spelling is kept.
    pub fn register_type(&self, type_id: TypeId, type_name: &str) -> bool {
        match self.names.entry(type_id) {
            Entry::Vacant(slot) => {
                slot.insert(type_name.into());
                log::debug!("bound type id {} to '{}'", type_id, type_name);
                true
            }
            Entry::Occupied(slot) => {
                let matches = slot.get().to_lowercase() == type_name.to_lowercase();
                if !matches {
                    log::warn!(
                        "type id {} already bound to '{}', rejected '{}'",
                        type_id,
                        slot.get(),
                        type_name
                    );
                }
                matches
            }
        }
    }

    /// Bulk registration; merges schema sets instead of overwriting.
    pub fn put_types(&self, types: Vec<BinaryTypeMetadata>) -> Result<()> {
        for meta in types {
            self.bind_name(meta.type_id(), meta.type_name())?;
            self.types.merge(meta)?;
        }
        Ok(())
    }

    /// First-writer-wins enum registration. Returns the canonical
    /// metadata, which may predate this call.
    pub fn register_enum(
        &self,
        type_name: &str,
        mapping: EnumMapping,
    ) -> Result<Arc<BinaryTypeMetadata>> {
        let meta = BinaryTypeMetadata::new_enum(type_name, mapping);
        self.bind_name(meta.type_id(), type_name)?;
        let canonical = self.types.merge(meta)?;
        log::debug!(
            "enum '{}' registered with {} constants",
            type_name,
            canonical
                .enum_mapping()
                .map(|m| m.pairs().len())
                .unwrap_or(0)
        );
        Ok(canonical)
    }

    pub fn type_name(&self, type_id: TypeId) -> Option<String> {
        self.names.get(&type_id).map(|name| name.to_string())
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    fn bind_name(&self, type_id: TypeId, type_name: &str) -> Result<()> {
        if !self.register_type(type_id, type_name) {
            return Err(MetaError::NameCollision {
                type_id,
                existing: self
                    .type_name(type_id)
                    .unwrap_or_else(|| "<unknown>".to_string()),
                requested: type_name.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MetadataRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbin::hash;
    use gridbin::meta::BinarySchema;
    use std::thread;

    fn person_with(names: &[&str]) -> BinaryTypeMetadata {
        let mut meta = BinaryTypeMetadata::new_object("Person", None);
        meta.add_schema(BinarySchema::new(
            names.iter().map(|n| hash::field_id(n)).collect(),
        ))
        .expect("schema");
        meta
    }

    #[test]
    fn put_types_merges_schema_sets() {
        let registry = MetadataRegistry::new();
        registry
            .put_types(vec![person_with(&["id"])])
            .expect("first");
        registry
            .put_types(vec![person_with(&["id", "email"])])
            .expect("second");

        let meta = registry.get(hash::type_id("Person")).expect("entry");
        assert_eq!(meta.schemas().len(), 2);
        assert_eq!(registry.type_count(), 1);

        let schema_id = hash::schema_id(&[hash::field_id("id")]);
        let fields = registry
            .get_schema(hash::type_id("Person"), schema_id)
            .expect("schema");
        assert_eq!(fields.as_ref(), &[hash::field_id("id")]);
    }

    #[test]
    fn register_type_binding_is_first_writer_wins() {
        let registry = MetadataRegistry::new();
        assert!(registry.register_type(7, "Alpha"));
        assert!(registry.register_type(7, "alpha"));
        assert!(!registry.register_type(7, "Beta"));
        assert_eq!(registry.type_name(7), Some("Alpha".to_string()));
    }

    #[test]
    fn colliding_name_through_put_types_is_rejected() {
        let registry = MetadataRegistry::new();
        registry.put_types(vec![person_with(&["id"])]).expect("ok");

        let impostor = BinaryTypeMetadata::from_parts(
            hash::type_id("Person"),
            "Impostor".into(),
            None,
            Vec::new(),
            None,
        );
        assert!(matches!(
            registry.put_types(vec![impostor]).unwrap_err(),
            MetaError::NameCollision { .. }
        ));
    }

    #[test]
    fn enum_registration_is_first_writer_wins() {
        let registry = MetadataRegistry::new();
        let first = registry
            .register_enum(
                "Color",
                EnumMapping::new(vec![("RED".into(), 0), ("GREEN".into(), 1)]),
            )
            .expect("first");

        // Identical re-registration returns the canonical entry.
        let again = registry
            .register_enum(
                "Color",
                EnumMapping::new(vec![("RED".into(), 0), ("GREEN".into(), 1)]),
            )
            .expect("again");
        assert_eq!(first.enum_mapping(), again.enum_mapping());

        let grown = registry.register_enum(
            "Color",
            EnumMapping::new(vec![
                ("RED".into(), 0),
                ("GREEN".into(), 1),
                ("BLUE".into(), 2),
            ]),
        );
        assert!(matches!(
            grown.unwrap_err(),
            MetaError::EnumMismatch { .. }
        ));
    }

    #[test]
    fn forged_schema_id_is_a_fatal_collision() {
        let registry = MetadataRegistry::new();
        let genuine = person_with(&["id", "name"]);
        let schema_id = genuine.schemas()[0].id();
        registry.put_types(vec![genuine]).expect("ok");

        let mut forged = BinaryTypeMetadata::new_object("Person", None);
        forged
            .add_schema(BinarySchema::from_parts(
                schema_id,
                vec![hash::field_id("something_else")],
            ))
            .expect("local add");
        assert!(matches!(
            registry.put_types(vec![forged]).unwrap_err(),
            MetaError::SchemaCollision { .. }
        ));
    }

    #[test]
    fn concurrent_registrations_converge() {
        let registry = Arc::new(MetadataRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..50 {
                        registry
                            .put_types(vec![person_with(&["id", "name"])])
                            .expect("merge");
                        registry
                            .register_enum(
                                "Color",
                                EnumMapping::new(vec![("RED".into(), 0)]),
                            )
                            .expect("enum");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker");
        }

        assert_eq!(registry.type_count(), 2);
        let person = registry.get(hash::type_id("Person")).expect("person");
        assert_eq!(person.schemas().len(), 1);
    }
}
