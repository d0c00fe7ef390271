// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! JSON snapshot of the registry for diagnostics and tooling.
//!
//! The snapshot is a plain serde model, sorted by type name so repeated
//! dumps diff cleanly. Metadata is restart-volatile by design, so this
//! is an observability surface, not a persistence format.

use crate::registry::MetadataRegistry;
use gridbin::{FieldId, SchemaId, TypeId};
use serde::{Deserialize, Serialize};

/// Full registry contents at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub types: Vec<TypeSnapshot>,
}

/// One type's metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSnapshot {
    pub type_id: TypeId,
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity_key_field: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<SchemaSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_mapping: Option<Vec<(String, i32)>>,
}

/// One schema of a type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub schema_id: SchemaId,
    pub field_ids: Vec<FieldId>,
}

impl RegistrySnapshot {
    /// Capture the registry's current contents.
    pub fn capture(registry: &MetadataRegistry) -> Self {
        let mut types: Vec<TypeSnapshot> = registry
            .all()
            .into_iter()
            .map(|meta| TypeSnapshot {
                type_id: meta.type_id(),
                type_name: meta.type_name().to_string(),
                affinity_key_field: meta.affinity_key_field().map(ToString::to_string),
                schemas: meta
                    .schemas()
                    .iter()
                    .map(|schema| SchemaSnapshot {
                        schema_id: schema.id(),
                        field_ids: schema.field_ids().to_vec(),
                    })
                    .collect(),
                enum_mapping: meta.enum_mapping().map(|m| m.pairs().to_vec()),
            })
            .collect();
        types.sort_by(|a, b| a.type_name.cmp(&b.type_name));
        Self { types }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
