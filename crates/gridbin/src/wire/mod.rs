// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 gridbin.dev

//! Binary object wire format.
//!
//! Every encoded object starts with a fixed preamble followed by
//! schema-ordered field entries, an optional raw suffix, and a footer of
//! per-field offsets for random access:
//!
//! ```text
//! offset  0  type_id       i32 LE
//!         4  schema_id     i32 LE
//!         8  length        i32 LE   total object size in bytes
//!        12  flags         u8
//!        13  footer_offset u32 LE   == length when the object has no footer
//!        17  field entries | raw suffix | footer | [raw_offset u32]
//! ```
//!
//! Enum objects carry a single `i32` ordinal instead of a field list; null
//! objects carry nothing. The footer comes in two shapes: compact (offsets
//! only, by-name access needs the schema) and full (field id + offset per
//! entry, self-describing by id). The trailing `raw_offset` word exists
//! only when [`flags::HAS_RAW`] is set.
//!
//! All constants here are part of the wire contract. Never hardcode them
//! elsewhere.

pub mod builder;
pub mod cursor;
pub mod reader;
pub mod value;
pub mod writer;

pub use builder::BinaryObjectBuilder;
pub use cursor::{ByteWriter, Cursor};
pub use reader::BinaryObjectReader;
pub use value::BinaryValue;
pub use writer::{BinaryObjectWriter, EncodedObject};

use std::fmt;

/// Preamble flag bits.
pub mod flags {
    /// The object is an encoded null value.
    pub const NULL_OBJECT: u8 = 0x01;
    /// The payload is a single enum ordinal.
    pub const ENUM: u8 = 0x02;
    /// A raw-mode suffix follows the field entries.
    pub const HAS_RAW: u8 = 0x04;
    /// Footer entries carry offsets only; field ids come from the schema.
    pub const COMPACT_FOOTER: u8 = 0x08;
}

/// Size of the fixed preamble in bytes.
pub const HEADER_SIZE: usize = 17;

/// Footer entry size in compact mode (offset only).
pub const FOOTER_ENTRY_COMPACT: usize = 4;

/// Footer entry size in full mode (field id + offset).
pub const FOOTER_ENTRY_FULL: usize = 8;

/// Field value tags. A field entry is a tag byte followed by its payload.
pub mod tag {
    pub const NULL: u8 = 0;
    pub const BOOL: u8 = 1;
    pub const I8: u8 = 2;
    pub const I16: u8 = 3;
    pub const I32: u8 = 4;
    pub const I64: u8 = 5;
    pub const F32: u8 = 6;
    pub const F64: u8 = 7;
    pub const STRING: u8 = 8;
    pub const BYTES: u8 = 9;
    pub const ENUM: u8 = 10;
    pub const OBJECT: u8 = 11;
}

/// Low-level codec failure (bounds, malformed payload).
///
/// Converted into [`crate::MetaError::Corrupt`] at the decode boundary.
#[derive(Debug, Clone)]
pub enum CodecError {
    ReadFailed { offset: usize, reason: String },
    InvalidData { offset: usize, reason: String },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            CodecError::InvalidData { offset, reason } => {
                write!(f, "invalid data at offset {}: {}", offset, reason)
            }
        }
    }
}

impl std::error::Error for CodecError {}

pub type CodecResult<T> = std::result::Result<T, CodecError>;
