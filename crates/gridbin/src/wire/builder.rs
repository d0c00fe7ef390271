// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Fluent draft of a binary object.
//!
//! A builder is pure data: the marshaller turns it into bytes, registers
//! whatever metadata the draft implies, and owns all error paths. Setting
//! a field whose id is already present replaces the earlier value (ids
//! are case-insensitive hashes, so `"Id"` and `"id"` are the same slot).

use super::BinaryValue;
use crate::hash;

/// Draft of one binary object, keyed by field name in insertion order.
#[derive(Debug, Clone)]
pub struct BinaryObjectBuilder {
    type_name: String,
    fields: Vec<(String, BinaryValue)>,
    raw: Vec<u8>,
    affinity_key: Option<String>,
}

impl BinaryObjectBuilder {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
            raw: Vec::new(),
            affinity_key: None,
        }
    }

    /// Set a named field. Insertion order defines the schema.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<BinaryValue>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Non-consuming variant of [`field`](Self::field) for loop-driven
    /// construction.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<BinaryValue>) {
        let name = name.into();
        let id = hash::field_id(&name);
        if let Some(slot) = self
            .fields
            .iter_mut()
            .find(|(existing, _)| hash::field_id(existing) == id)
        {
            slot.1 = value.into();
        } else {
            self.fields.push((name, value.into()));
        }
    }

    /// Append raw-mode bytes (position-addressable suffix).
    #[must_use]
    pub fn raw(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.raw.extend_from_slice(bytes.as_ref());
        self
    }

    /// Declare which field carries the affinity key for this type.
    #[must_use]
    pub fn affinity_key(mut self, field_name: impl Into<String>) -> Self {
        self.affinity_key = Some(field_name.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[(String, BinaryValue)] {
        &self.fields
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn affinity_key_field(&self) -> Option<&str> {
        self.affinity_key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let b = BinaryObjectBuilder::new("Person")
            .field("id", 100i32)
            .field("name", "foo")
            .field("score", 1.5f64);
        let names: Vec<&str> = b.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["id", "name", "score"]);
    }

    #[test]
    fn same_field_id_replaces_value() {
        let b = BinaryObjectBuilder::new("Person")
            .field("Id", 1i32)
            .field("id", 2i32);
        assert_eq!(b.fields().len(), 1);
        assert_eq!(b.fields()[0].1, BinaryValue::I32(2));
        // The original spelling wins for the name.
        assert_eq!(b.fields()[0].0, "Id");
    }

    #[test]
    fn raw_and_affinity_are_carried() {
        let b = BinaryObjectBuilder::new("Blob")
            .field("len", 3i32)
            .raw([1u8, 2, 3])
            .affinity_key("len");
        assert_eq!(b.raw_bytes(), &[1, 2, 3]);
        assert_eq!(b.affinity_key_field(), Some("len"));
    }
}
