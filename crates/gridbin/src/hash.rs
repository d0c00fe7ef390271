// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Identity hashing for type names, field names, and schemas.
//!
//! These functions are part of the wire contract: every language
//! implementation of the protocol must reproduce them bit-exactly, or
//! peers will compute different ids for the same type and metadata
//! resolution breaks. Do not replace them with a hashing crate.
//!
//! Type and field ids use the classic 31-multiply string hash over the
//! UTF-16 code units of the lower-cased name. Schema ids accumulate the
//! four little-endian bytes of each field id with FNV-1a, which makes the
//! id a pure function of the ordered field-id list.
//!
//! Collisions between distinct names (or distinct field-id lists) are a
//! documented assumption, not an enforced invariant: the registry rejects
//! a collision when it observes one, but there is no tie-break.

use crate::{FieldId, SchemaId, TypeId};

/// FNV-1a offset basis (schema-id accumulator seed).
pub const FNV1_OFFSET_BASIS: u32 = 0x811C_9DC5;

/// FNV-1a prime.
pub const FNV1_PRIME: u32 = 0x0100_0193;

/// Stable id for a type name.
///
/// The name is lower-cased first, so `"Person"`, `"person"` and
/// `"PERSON"` all map to the same id.
pub fn type_id(type_name: &str) -> TypeId {
    lower_name_hash(type_name)
}

/// Stable id for a field name, lower-cased like [`type_id`].
pub fn field_id(field_name: &str) -> FieldId {
    lower_name_hash(field_name)
}

/// Schema id of an ordered field-id list.
///
/// The empty list hashes to the FNV offset basis.
pub fn schema_id(field_ids: &[FieldId]) -> SchemaId {
    let mut hash = FNV1_OFFSET_BASIS;
    for id in field_ids {
        hash = update_schema_id(hash, *id);
    }
    hash as SchemaId
}

/// Fold one field id into a running schema-id accumulator.
///
/// Exposed separately so incremental writers can fold ids as fields are
/// appended instead of collecting the list first.
pub fn update_schema_id(accumulator: u32, field_id: FieldId) -> u32 {
    let mut hash = accumulator;
    for byte in (field_id as u32).to_le_bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV1_PRIME);
    }
    hash
}

/// 31-multiply hash over the UTF-16 code units of the lower-cased name.
fn lower_name_hash(name: &str) -> i32 {
    let mut hash: i32 = 0;
    for unit in name.to_lowercase().encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    hash
}
