// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Binary object encoder.
//!
//! The writer collects field entries in schema order, then assembles the
//! final object in one pass: preamble, field data, optional raw suffix,
//! footer, trailing raw-offset word. The schema id falls out of the
//! ordered field-id list, so it is only known at `finish()`.

use super::cursor::{write_string, ByteWriter};
use super::{flags, tag, BinaryValue, HEADER_SIZE};
use crate::{hash, FieldId, SchemaId, TypeId};

/// A fully encoded object plus the schema it was laid out with.
///
/// The marshaller uses `field_ids` to publish the schema before handing
/// the bytes out.
#[derive(Debug, Clone)]
pub struct EncodedObject {
    pub bytes: Vec<u8>,
    pub type_id: TypeId,
    pub schema_id: SchemaId,
    pub field_ids: Vec<FieldId>,
}

/// Streaming encoder for one binary object.
pub struct BinaryObjectWriter {
    type_id: TypeId,
    compact_footer: bool,
    payload: ByteWriter,
    field_ids: Vec<FieldId>,
    /// Field start offsets relative to the payload start.
    field_offsets: Vec<u32>,
    raw: Vec<u8>,
}

impl BinaryObjectWriter {
    pub fn new(type_id: TypeId, compact_footer: bool) -> Self {
        Self {
            type_id,
            compact_footer,
            payload: ByteWriter::new(),
            field_ids: Vec::new(),
            field_offsets: Vec::new(),
            raw: Vec::new(),
        }
    }

    /// Append one field in schema order.
    pub fn write_field(&mut self, field_id: FieldId, value: &BinaryValue) {
        self.field_ids.push(field_id);
        self.field_offsets.push(self.payload.position() as u32);
        write_value(&mut self.payload, value);
    }

    /// Set the raw-mode suffix (opaque bytes after the field entries,
    /// addressable only by position).
    pub fn write_raw(&mut self, raw: &[u8]) {
        self.raw.extend_from_slice(raw);
    }

    /// Assemble the final object.
    pub fn finish(self) -> EncodedObject {
        let schema_id = hash::schema_id(&self.field_ids);
        let payload = self.payload.into_bytes();

        let entry_size = if self.compact_footer {
            super::FOOTER_ENTRY_COMPACT
        } else {
            super::FOOTER_ENTRY_FULL
        };
        let footer_offset = HEADER_SIZE + payload.len() + self.raw.len();
        let mut length = footer_offset + self.field_ids.len() * entry_size;

        let mut obj_flags = 0u8;
        if self.compact_footer {
            obj_flags |= flags::COMPACT_FOOTER;
        }
        if !self.raw.is_empty() {
            obj_flags |= flags::HAS_RAW;
            length += 4; // trailing raw_offset word
        }

        let mut w = ByteWriter::with_capacity(length);
        w.write_i32_le(self.type_id);
        w.write_i32_le(schema_id);
        w.write_i32_le(length as i32);
        w.write_u8(obj_flags);
        w.write_u32_le(footer_offset as u32);
        w.write_bytes(&payload);
        w.write_bytes(&self.raw);
        for (idx, rel) in self.field_offsets.iter().enumerate() {
            if !self.compact_footer {
                w.write_i32_le(self.field_ids[idx]);
            }
            w.write_u32_le(rel + HEADER_SIZE as u32);
        }
        if !self.raw.is_empty() {
            w.write_u32_le((HEADER_SIZE + payload.len()) as u32);
        }

        EncodedObject {
            bytes: w.into_bytes(),
            type_id: self.type_id,
            schema_id,
            field_ids: self.field_ids,
        }
    }
}

/// Encode a standalone enum value (single-ordinal payload).
pub fn encode_enum(type_id: TypeId, ordinal: i32) -> Vec<u8> {
    let length = HEADER_SIZE + 4;
    let mut w = ByteWriter::with_capacity(length);
    w.write_i32_le(type_id);
    w.write_i32_le(0);
    w.write_i32_le(length as i32);
    w.write_u8(flags::ENUM);
    w.write_u32_le(length as u32);
    w.write_i32_le(ordinal);
    w.into_bytes()
}

/// Encode a null object.
pub fn encode_null() -> Vec<u8> {
    let mut w = ByteWriter::with_capacity(HEADER_SIZE);
    w.write_i32_le(0);
    w.write_i32_le(0);
    w.write_i32_le(HEADER_SIZE as i32);
    w.write_u8(flags::NULL_OBJECT);
    w.write_u32_le(HEADER_SIZE as u32);
    w.into_bytes()
}

fn write_value(w: &mut ByteWriter, value: &BinaryValue) {
    match value {
        BinaryValue::Null => w.write_u8(tag::NULL),
        BinaryValue::Bool(v) => {
            w.write_u8(tag::BOOL);
            w.write_u8(u8::from(*v));
        }
        BinaryValue::I8(v) => {
            w.write_u8(tag::I8);
            w.write_i8(*v);
        }
        BinaryValue::I16(v) => {
            w.write_u8(tag::I16);
            w.write_i16_le(*v);
        }
        BinaryValue::I32(v) => {
            w.write_u8(tag::I32);
            w.write_i32_le(*v);
        }
        BinaryValue::I64(v) => {
            w.write_u8(tag::I64);
            w.write_i64_le(*v);
        }
        BinaryValue::F32(v) => {
            w.write_u8(tag::F32);
            w.write_f32_le(*v);
        }
        BinaryValue::F64(v) => {
            w.write_u8(tag::F64);
            w.write_f64_le(*v);
        }
        BinaryValue::String(v) => {
            w.write_u8(tag::STRING);
            write_string(w, v);
        }
        BinaryValue::Bytes(v) => {
            w.write_u8(tag::BYTES);
            w.write_u32_le(v.len() as u32);
            w.write_bytes(v);
        }
        BinaryValue::Enum { type_id, ordinal } => {
            w.write_u8(tag::ENUM);
            w.write_i32_le(*type_id);
            w.write_i32_le(*ordinal);
        }
        BinaryValue::Object(v) => {
            w.write_u8(tag::OBJECT);
            w.write_u32_le(v.len() as u32);
            w.write_bytes(v);
        }
    }
}
