// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Binary object decoder.
//!
//! `BinaryObjectReader` owns the encoded bytes and validates the preamble
//! and footer geometry up front; field values are decoded lazily on
//! access. Positional access works with no metadata at all. By-id access
//! works directly on full footers, or through a schema (ordered field-id
//! list) on compact ones — fetching that schema is the marshaller's job,
//! not this module's.

use super::cursor::Cursor;
use super::{flags, tag, BinaryValue, CodecError, CodecResult};
use super::{FOOTER_ENTRY_COMPACT, FOOTER_ENTRY_FULL, HEADER_SIZE};
use crate::{FieldId, SchemaId, TypeId};

/// Parsed, validated view over one encoded binary object.
#[derive(Debug, Clone)]
pub struct BinaryObjectReader {
    bytes: Vec<u8>,
    type_id: TypeId,
    schema_id: SchemaId,
    flags: u8,
    /// Start of the footer; == object length when there is no footer.
    footer_offset: usize,
    /// Start of the raw suffix; == footer_offset when there is none.
    raw_offset: usize,
    field_count: usize,
}

impl BinaryObjectReader {
    /// Parse and validate the object geometry. Field payloads are not
    /// touched until accessed.
    pub fn parse(bytes: Vec<u8>) -> CodecResult<Self> {
        let mut cur = Cursor::new(&bytes);
        let type_id = cur.read_i32_le()?;
        let schema_id = cur.read_i32_le()?;
        let length = cur.read_i32_le()?;
        let obj_flags = cur.read_u8()?;
        let footer_offset = cur.read_u32_le()? as usize;

        if length < 0 || length as usize != bytes.len() {
            return Err(CodecError::InvalidData {
                offset: 8,
                reason: "length word does not match buffer size".into(),
            });
        }
        let length = length as usize;
        if footer_offset < HEADER_SIZE || footer_offset > length {
            return Err(CodecError::InvalidData {
                offset: 13,
                reason: "footer offset out of bounds".into(),
            });
        }

        if obj_flags & (flags::NULL_OBJECT | flags::ENUM) != 0 {
            // Null and enum objects carry no footer.
            return Ok(Self {
                bytes,
                type_id,
                schema_id,
                flags: obj_flags,
                footer_offset: length,
                raw_offset: length,
                field_count: 0,
            });
        }

        let tail = if obj_flags & flags::HAS_RAW != 0 { 4 } else { 0 };
        if footer_offset + tail > length {
            return Err(CodecError::InvalidData {
                offset: 13,
                reason: "footer overlaps trailing raw-offset word".into(),
            });
        }
        let footer_len = length - tail - footer_offset;
        let entry_size = if obj_flags & flags::COMPACT_FOOTER != 0 {
            FOOTER_ENTRY_COMPACT
        } else {
            FOOTER_ENTRY_FULL
        };
        if footer_len % entry_size != 0 {
            return Err(CodecError::InvalidData {
                offset: footer_offset,
                reason: "footer size is not a multiple of the entry size".into(),
            });
        }
        let field_count = footer_len / entry_size;

        let raw_offset = if obj_flags & flags::HAS_RAW != 0 {
            let mut tail_cur = Cursor::at(&bytes, length - 4)?;
            let raw_offset = tail_cur.read_u32_le()? as usize;
            if raw_offset < HEADER_SIZE || raw_offset > footer_offset {
                return Err(CodecError::InvalidData {
                    offset: length - 4,
                    reason: "raw offset out of bounds".into(),
                });
            }
            raw_offset
        } else {
            footer_offset
        };

        Ok(Self {
            bytes,
            type_id,
            schema_id,
            flags: obj_flags,
            footer_offset,
            raw_offset,
            field_count,
        })
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }

    pub fn is_null(&self) -> bool {
        self.flags & flags::NULL_OBJECT != 0
    }

    pub fn is_enum(&self) -> bool {
        self.flags & flags::ENUM != 0
    }

    pub fn has_raw(&self) -> bool {
        self.flags & flags::HAS_RAW != 0
    }

    /// True when footer entries carry offsets only (field ids must come
    /// from the schema).
    pub fn is_compact_footer(&self) -> bool {
        self.flags & flags::COMPACT_FOOTER != 0
    }

    pub fn field_count(&self) -> usize {
        self.field_count
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Enum ordinal; errors on non-enum objects.
    pub fn ordinal(&self) -> CodecResult<i32> {
        if !self.is_enum() {
            return Err(CodecError::InvalidData {
                offset: 12,
                reason: "not an enum object".into(),
            });
        }
        Cursor::at(&self.bytes, HEADER_SIZE)?.read_i32_le()
    }

    /// Raw-mode suffix, if the object carries one.
    pub fn raw(&self) -> Option<&[u8]> {
        if self.has_raw() {
            Some(&self.bytes[self.raw_offset..self.footer_offset])
        } else {
            None
        }
    }

    /// Decode the field at a schema position. Works with no metadata.
    pub fn field_at(&self, index: usize) -> CodecResult<BinaryValue> {
        let (_, offset) = self.footer_entry(index)?;
        if offset < HEADER_SIZE || offset >= self.raw_offset {
            return Err(CodecError::InvalidData {
                offset,
                reason: "field offset outside the field data region".into(),
            });
        }
        let mut cur = Cursor::at(&self.bytes, offset)?;
        read_value(&mut cur)
    }

    /// Field id recorded in the footer at `index` (full footers only).
    pub fn footer_field_id(&self, index: usize) -> CodecResult<Option<FieldId>> {
        let (field_id, _) = self.footer_entry(index)?;
        Ok(field_id)
    }

    /// Locate a field by id using the footer's own ids (full footers
    /// only; `Ok(None)` when the id is absent).
    pub fn field_by_footer_id(&self, field_id: FieldId) -> CodecResult<Option<BinaryValue>> {
        if self.is_compact_footer() {
            return Err(CodecError::InvalidData {
                offset: self.footer_offset,
                reason: "compact footer carries no field ids".into(),
            });
        }
        for index in 0..self.field_count {
            if self.footer_entry(index)?.0 == Some(field_id) {
                return Ok(Some(self.field_at(index)?));
            }
        }
        Ok(None)
    }

    /// Locate a field by id through a schema (ordered field-id list).
    pub fn field_by_schema(
        &self,
        field_id: FieldId,
        schema: &[FieldId],
    ) -> CodecResult<Option<BinaryValue>> {
        if schema.len() != self.field_count {
            return Err(CodecError::InvalidData {
                offset: self.footer_offset,
                reason: "schema length does not match footer entry count".into(),
            });
        }
        match schema.iter().position(|&f| f == field_id) {
            Some(index) => Ok(Some(self.field_at(index)?)),
            None => Ok(None),
        }
    }

    /// Footer entry at `index`: (field id if the footer carries one,
    /// absolute field offset).
    fn footer_entry(&self, index: usize) -> CodecResult<(Option<FieldId>, usize)> {
        if index >= self.field_count {
            return Err(CodecError::ReadFailed {
                offset: self.footer_offset,
                reason: "field index beyond footer".into(),
            });
        }
        if self.is_compact_footer() {
            let at = self.footer_offset + index * FOOTER_ENTRY_COMPACT;
            let mut cur = Cursor::at(&self.bytes, at)?;
            Ok((None, cur.read_u32_le()? as usize))
        } else {
            let at = self.footer_offset + index * FOOTER_ENTRY_FULL;
            let mut cur = Cursor::at(&self.bytes, at)?;
            let field_id = cur.read_i32_le()?;
            Ok((Some(field_id), cur.read_u32_le()? as usize))
        }
    }
}

/// Decode one tagged field value at the cursor.
fn read_value(cur: &mut Cursor<'_>) -> CodecResult<BinaryValue> {
    let offset = cur.offset();
    let value_tag = cur.read_u8()?;
    match value_tag {
        tag::NULL => Ok(BinaryValue::Null),
        tag::BOOL => Ok(BinaryValue::Bool(cur.read_u8()? != 0)),
        tag::I8 => Ok(BinaryValue::I8(cur.read_i8()?)),
        tag::I16 => Ok(BinaryValue::I16(cur.read_i16_le()?)),
        tag::I32 => Ok(BinaryValue::I32(cur.read_i32_le()?)),
        tag::I64 => Ok(BinaryValue::I64(cur.read_i64_le()?)),
        tag::F32 => Ok(BinaryValue::F32(cur.read_f32_le()?)),
        tag::F64 => Ok(BinaryValue::F64(cur.read_f64_le()?)),
        tag::STRING => Ok(BinaryValue::String(cur.read_string()?)),
        tag::BYTES => Ok(BinaryValue::Bytes(cur.read_len_prefixed()?.to_vec())),
        tag::ENUM => Ok(BinaryValue::Enum {
            type_id: cur.read_i32_le()?,
            ordinal: cur.read_i32_le()?,
        }),
        tag::OBJECT => Ok(BinaryValue::Object(cur.read_len_prefixed()?.to_vec())),
        other => Err(CodecError::InvalidData {
            offset,
            reason: format!("unknown field tag {}", other),
        }),
    }
}
