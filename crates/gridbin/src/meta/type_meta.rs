// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Type metadata: schemas, enum mappings, and the merge rules shared by
//! the process-local store and the authoritative registry.
//!
//! Merging is commutative and idempotent: schema sets are unioned, and
//! every divergence that cannot be unioned (same schema id with different
//! fields, enum mapping drift, kind or affinity-key mismatch) is a fatal
//! conflict rather than a silent overwrite.

use crate::error::{MetaError, Result};
use crate::{hash, FieldId, SchemaId, TypeId};
use std::sync::Arc;

/// One immutable field layout of a type.
#[derive(Debug, Clone)]
pub struct BinarySchema {
    id: SchemaId,
    field_ids: Arc<[FieldId]>,
}

impl BinarySchema {
    /// Build a schema from an ordered field-id list; the id is derived.
    pub fn new(field_ids: Vec<FieldId>) -> Self {
        let id = hash::schema_id(&field_ids);
        Self {
            id,
            field_ids: field_ids.into(),
        }
    }

    /// Reconstruct a schema whose id was carried separately (wire side).
    pub fn from_parts(id: SchemaId, field_ids: Vec<FieldId>) -> Self {
        Self {
            id,
            field_ids: field_ids.into(),
        }
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn field_ids(&self) -> &Arc<[FieldId]> {
        &self.field_ids
    }
}

/// Ordered `(name, ordinal)` pairs of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMapping {
    pairs: Vec<(String, i32)>,
}

impl EnumMapping {
    pub fn new(pairs: Vec<(String, i32)>) -> Self {
        Self { pairs }
    }

    pub fn name_of(&self, ordinal: i32) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(_, o)| *o == ordinal)
            .map(|(n, _)| n.as_str())
    }

    pub fn ordinal_of(&self, name: &str) -> Option<i32> {
        self.pairs.iter().find(|(n, _)| n == name).map(|(_, o)| *o)
    }

    pub fn pairs(&self) -> &[(String, i32)] {
        &self.pairs
    }
}

/// Everything the cluster knows about one type id.
#[derive(Debug, Clone)]
pub struct BinaryTypeMetadata {
    type_id: TypeId,
    type_name: String,
    affinity_key_field: Option<String>,
    schemas: Vec<BinarySchema>,
    enum_mapping: Option<EnumMapping>,
}

impl BinaryTypeMetadata {
    /// Metadata for a regular object type with no schemas yet.
    pub fn new_object(type_name: impl Into<String>, affinity_key_field: Option<String>) -> Self {
        let type_name = type_name.into();
        Self {
            type_id: hash::type_id(&type_name),
            type_name,
            affinity_key_field,
            schemas: Vec::new(),
            enum_mapping: None,
        }
    }

    /// Metadata for an enumeration. Enum types never carry schemas.
    pub fn new_enum(type_name: impl Into<String>, mapping: EnumMapping) -> Self {
        let type_name = type_name.into();
        Self {
            type_id: hash::type_id(&type_name),
            type_name,
            affinity_key_field: None,
            schemas: Vec::new(),
            enum_mapping: Some(mapping),
        }
    }

    /// Reconstruct metadata from wire parts (the type id travels
    /// separately so explicitly assigned ids survive).
    pub fn from_parts(
        type_id: TypeId,
        type_name: String,
        affinity_key_field: Option<String>,
        schemas: Vec<BinarySchema>,
        enum_mapping: Option<EnumMapping>,
    ) -> Self {
        Self {
            type_id,
            type_name,
            affinity_key_field,
            schemas,
            enum_mapping,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn affinity_key_field(&self) -> Option<&str> {
        self.affinity_key_field.as_deref()
    }

    pub fn is_enum(&self) -> bool {
        self.enum_mapping.is_some()
    }

    pub fn enum_mapping(&self) -> Option<&EnumMapping> {
        self.enum_mapping.as_ref()
    }

    pub fn schemas(&self) -> &[BinarySchema] {
        &self.schemas
    }

    pub fn schema(&self, schema_id: SchemaId) -> Option<&BinarySchema> {
        self.schemas.iter().find(|s| s.id() == schema_id)
    }

    /// Add one schema. `Ok(false)` when an identical schema was already
    /// present; `SchemaCollision` when the id is taken by different
    /// fields; `MergeConflict` on enum types.
    pub fn add_schema(&mut self, schema: BinarySchema) -> Result<bool> {
        if self.is_enum() {
            return Err(MetaError::MergeConflict {
                type_name: self.type_name.clone(),
                reason: "enum types carry no schemas".into(),
            });
        }
        match self.schema(schema.id()) {
            Some(existing) if existing.field_ids() == schema.field_ids() => Ok(false),
            Some(_) => Err(MetaError::SchemaCollision {
                type_id: self.type_id,
                schema_id: schema.id(),
            }),
            None => {
                self.schemas.push(schema);
                Ok(true)
            }
        }
    }

    /// Merge `incoming` into this metadata, returning the merged copy, or
    /// `None` when this metadata already covers everything incoming has.
    pub fn merge(&self, incoming: &BinaryTypeMetadata) -> Result<Option<BinaryTypeMetadata>> {
        if self.type_id != incoming.type_id {
            return Err(MetaError::MergeConflict {
                type_name: self.type_name.clone(),
                reason: "type id mismatch".into(),
            });
        }
        if self.type_name.to_lowercase() != incoming.type_name.to_lowercase() {
            return Err(MetaError::NameCollision {
                type_id: self.type_id,
                existing: self.type_name.clone(),
                requested: incoming.type_name.clone(),
            });
        }
        if self.is_enum() != incoming.is_enum() {
            return Err(MetaError::MergeConflict {
                type_name: self.type_name.clone(),
                reason: "object type re-registered as enum (or vice versa)".into(),
            });
        }
        if let (Some(a), Some(b)) = (&self.enum_mapping, &incoming.enum_mapping) {
            if a != b {
                return Err(MetaError::EnumMismatch {
                    type_name: self.type_name.clone(),
                });
            }
        }
        if let (Some(a), Some(b)) = (&self.affinity_key_field, &incoming.affinity_key_field) {
            if a != b {
                return Err(MetaError::MergeConflict {
                    type_name: self.type_name.clone(),
                    reason: format!("affinity key '{}' re-declared as '{}'", a, b),
                });
            }
        }

        let mut merged = self.clone();
        let mut changed = false;
        if merged.affinity_key_field.is_none() && incoming.affinity_key_field.is_some() {
            merged.affinity_key_field = incoming.affinity_key_field.clone();
            changed = true;
        }
        for schema in &incoming.schemas {
            if merged.add_schema(schema.clone())? {
                changed = true;
            }
        }
        Ok(if changed { Some(merged) } else { None })
    }
}
